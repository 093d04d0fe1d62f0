//! Resolve command implementation.
//!
//! Reads one workspace symbol or an array of them from stdin, as produced by
//! `ctagsym search --json`, and prints them with resolved locations.

use std::io;

use anyhow::{Context as _, Result};
use ctagsym::lsp;
use lsp_types::WorkspaceSymbol;
use rayon::prelude::*;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Input {
    One(Box<WorkspaceSymbol>),
    Many(Vec<WorkspaceSymbol>),
}

/// Run the resolve command.
pub fn run() -> Result<()> {
    let input: Input = serde_json::from_reader(io::stdin().lock())
        .context("expected a workspace symbol or an array of them on stdin")?;

    let output = match input {
        Input::One(symbol) => serde_json::to_string_pretty(&lsp::resolve_workspace_symbol(*symbol))?,
        Input::Many(symbols) => {
            let resolved: Vec<WorkspaceSymbol> = symbols
                .into_par_iter()
                .map(lsp::resolve_workspace_symbol)
                .collect();
            serde_json::to_string_pretty(&resolved)?
        }
    };

    println!("{output}");
    Ok(())
}
