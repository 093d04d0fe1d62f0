//! Regenerate command implementation.

use anyhow::{Result, bail};
use colored::Colorize;
use ctagsym::{Regenerator, ShellRunner};

use super::Context;

/// Run the regenerate command.
pub fn run(ctx: &Context) -> Result<()> {
    let regenerator = Regenerator::new(ShellRunner, &ctx.settings);
    let results = regenerator.regenerate_all(&ctx.roots);

    let mut failed = 0;
    for (root, result) in &results {
        match result {
            Ok(()) => println!("  {} {}", "✓".green(), root.display()),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {e}", "✗".red(), root.display());
                if let Some(hint) = e.hint() {
                    println!("    {} {hint}", "hint:".dimmed());
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} roots failed to regenerate", results.len());
    }

    println!(
        "\n{} {} tags file{}",
        "Regenerated".green().bold(),
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
