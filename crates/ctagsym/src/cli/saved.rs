//! Saved command implementation.

use std::path::Path;

use anyhow::{Context as _, Result, anyhow};
use colored::Colorize;
use ctagsym::{Regenerator, SaveOutcome, ShellRunner};

use super::Context;

/// Run the saved command.
pub fn run(ctx: &Context, path: &Path) -> Result<()> {
    let saved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("failed to get current directory")?
            .join(path)
    };
    let saved = saved.canonicalize().unwrap_or(saved);

    let regenerator = Regenerator::new(ShellRunner, &ctx.settings);
    match regenerator.on_file_saved(&ctx.roots, &saved) {
        SaveOutcome::Disabled => {
            println!("regenerateOnSave is disabled; nothing to do");
        }
        SaveOutcome::OutsideRoots => {
            println!("{} is outside every project root", saved.display());
        }
        SaveOutcome::TagsFileSaved => {
            println!("{} is the tags file; not regenerating", saved.display());
        }
        SaveOutcome::Scheduled { root, handle } => {
            let result = handle
                .join()
                .map_err(|_| anyhow!("regeneration thread for {} panicked", root.display()))?;
            if let Err(e) = result {
                if let Some(hint) = e.hint() {
                    eprintln!("  {} {hint}", "hint:".dimmed());
                }
                return Err(e).with_context(|| format!("failed to regenerate {}", root.display()));
            }
            println!("  {} regenerated {}", "✓".green(), root.display());
        }
    }

    Ok(())
}
