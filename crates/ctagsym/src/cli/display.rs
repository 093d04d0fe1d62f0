//! Common display utilities for CLI commands.

use colored::Colorize;
use ctagsym::{SymbolRecord, TargetAddress, Warning};

const MAX_DISPLAY_ITEMS: usize = 10;

/// `path:line` for resolved records, `path (address)` otherwise.
pub fn format_location(record: &SymbolRecord) -> String {
    let path = record.source_path.display();
    match (&record.location, &record.address) {
        (Some(pos), _) => format!("{path}:{}", pos.line + 1),
        (None, TargetAddress::LineNumber(line)) => format!("{path}:{line}"),
        (None, address @ TargetAddress::Pattern(_)) => format!("{path} ({address})"),
    }
}

/// Print up to `MAX_DISPLAY_ITEMS` warnings, then a count of the rest.
pub fn print_warnings(warnings: &[Warning]) {
    for warning in warnings.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {}", "•".dimmed(), warning.to_string().yellow());
    }

    if warnings.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            warnings.len() - MAX_DISPLAY_ITEMS
        );
    }
}
