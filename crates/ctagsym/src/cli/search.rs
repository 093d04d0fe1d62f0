//! Search command implementation.

use anyhow::Result;
use colored::Colorize;
use ctagsym::{MatchMode, SymbolProvider, lsp, resolve_all};
use lsp_types::WorkspaceSymbol;

use super::Context;
use super::display::format_location;

/// Flags for the search command.
pub struct SearchOptions {
    pub regex: bool,
    pub limit: Option<usize>,
    pub resolve: bool,
    pub json: bool,
}

/// Run the search command.
pub fn run(ctx: &Context, query: &str, options: &SearchOptions) -> Result<()> {
    let mut settings = ctx.settings.clone();
    if let Some(limit) = options.limit {
        settings.max_number_of_symbols = limit;
    }
    let min_query_length = settings.min_query_length;

    let mode = if options.regex {
        MatchMode::Regex
    } else {
        MatchMode::Substring
    };

    let provider = SymbolProvider::new(ctx.roots.clone(), settings);
    let mut records = provider.query(query, mode)?;
    if options.resolve {
        records = resolve_all(&records);
    }

    if options.json {
        let symbols = records
            .iter()
            .map(lsp::to_workspace_symbol)
            .collect::<ctagsym::Result<Vec<WorkspaceSymbol>>>()?;
        println!("{}", serde_json::to_string_pretty(&symbols)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No symbols found matching \"{query}\"");
        if query.chars().count() < min_query_length {
            println!(
                "  {} queries shorter than {min_query_length} characters are not searched",
                "hint:".dimmed()
            );
        } else if provider.with_index(|index| index.entries().is_empty()) {
            println!(
                "  {} no tags were loaded; run `ctagsym regenerate` first",
                "hint:".dimmed()
            );
        }
        return Ok(());
    }

    println!(
        "Found {} symbol{} matching \"{}\":\n",
        records.len(),
        if records.len() == 1 { "" } else { "s" },
        query.cyan()
    );

    for record in &records {
        let container = if record.container_name.is_empty() {
            String::new()
        } else {
            format!(" in {}", record.container_name.dimmed())
        };
        println!(
            "  {}{container}  {}",
            record.name.green().bold(),
            format_location(record).dimmed()
        );
    }

    Ok(())
}
