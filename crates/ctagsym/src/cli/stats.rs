//! Stats command implementation.

use anyhow::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use ctagsym::SymbolProvider;

use super::Context;
use super::display::print_warnings;

/// Run the stats command.
pub fn run(ctx: &Context, show_warnings: bool) -> Result<()> {
    let provider = SymbolProvider::new(ctx.roots.clone(), ctx.settings.clone());
    provider.refresh();

    provider.with_index(|index| {
        for cache in index.caches() {
            println!("{}", cache.root().display().to_string().bold());
            println!("  Tags file:  {}", cache.backing_file().display());

            if let Some(error) = cache.read_error() {
                println!("  {} {error}", "unreadable:".red());
                continue;
            }

            let loaded_at: DateTime<Local> = cache.loaded_at().into();
            println!("  Symbols:    {}", cache.entries().len());
            println!(
                "  Format:     {}",
                cache
                    .format_version()
                    .map_or_else(|| "unknown".to_string(), |v| v.to_string())
            );
            println!("  Loaded at:  {}", loaded_at.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "  Duplicates: {}",
                if cache.is_deduplicated() { "hidden" } else { "kept" }
            );

            let warnings = cache.warnings();
            if !warnings.is_empty() {
                println!("  Warnings:   {}", warnings.len().to_string().yellow());
                if show_warnings {
                    print_warnings(warnings);
                }
            }
        }

        println!(
            "\n{} {} symbols across {} root{}",
            "Total:".bold(),
            index.entries().len(),
            ctx.roots.len(),
            if ctx.roots.len() == 1 { "" } else { "s" }
        );
    });

    Ok(())
}
