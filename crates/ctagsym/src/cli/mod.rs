//! CLI command implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use ctagsym::Settings;

mod display;

pub mod regenerate;
pub mod resolve;
pub mod saved;
pub mod search;
pub mod stats;

/// Roots and settings shared by every command.
pub struct Context {
    pub roots: Vec<PathBuf>,
    pub settings: Settings,
}

impl Context {
    /// Canonicalize the roots (defaulting to the current directory) and load
    /// settings from `config` or from the first root.
    pub fn load(roots: Vec<PathBuf>, config: Option<&Path>) -> Result<Self> {
        let roots = if roots.is_empty() {
            vec![std::env::current_dir().context("failed to get current directory")?]
        } else {
            roots
        };

        let roots = roots
            .iter()
            .map(|root| {
                root.canonicalize()
                    .with_context(|| format!("project root not found: {}", root.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        let settings = match config {
            Some(path) => Settings::load(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::discover(&roots[0]).context("failed to load settings")?,
        };

        Ok(Self { roots, settings })
    }
}
