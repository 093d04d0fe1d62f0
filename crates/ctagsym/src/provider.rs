//! Thread-safe workspace symbol provider.
//!
//! [`SymbolProvider`] binds a [`TagIndex`] to a set of project roots and
//! their settings, and exposes the two operations a host editor calls:
//! searching symbols and resolving a chosen one.
//!
//! The index sits behind a mutex held for the whole refresh-then-filter
//! sequence, so a query issued while another query is refreshing waits for
//! that refresh instead of reading a stale view. Resolution never takes the
//! lock. Queries may be issued from rayon tasks: a refresh running on a rayon
//! worker does not fan out, so the worker holding the lock never picks up a
//! query that waits on it.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lsp_types::WorkspaceSymbol;
use tracing::warn;

use crate::config::Settings;
use crate::error::Result;
use crate::index::{RefreshOutcome, TagIndex};
use crate::lsp;
use crate::query::MatchMode;
use crate::types::SymbolRecord;

/// Workspace symbol search over the tags files of several roots.
#[derive(Debug)]
pub struct SymbolProvider {
    roots: Vec<PathBuf>,
    settings: Settings,
    index: Mutex<TagIndex>,
}

impl SymbolProvider {
    /// Create a provider with an empty index.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, settings: Settings) -> Self {
        Self {
            roots,
            settings,
            index: Mutex::new(TagIndex::new()),
        }
    }

    /// Configured project roots, in priority order.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Active settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // The index is only ever replaced wholesale, so a panic elsewhere cannot
    // leave it half-updated and the poison flag can be ignored.
    fn lock(&self) -> MutexGuard<'_, TagIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reload any tags file that changed on disk.
    pub fn refresh(&self) -> RefreshOutcome {
        self.lock().refresh(
            &self.roots,
            &self.settings.tags_file_name,
            self.settings.hide_duplicate_tags,
        )
    }

    /// Search for symbols. Results are unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`](crate::Error::Query) for an invalid regex.
    pub fn query(&self, text: &str, mode: MatchMode) -> Result<Vec<SymbolRecord>> {
        self.lock().query(&self.roots, &self.settings, text, mode)
    }

    /// `workspace/symbol`: substring search returning LSP symbols whose
    /// locations are deferred until [`resolve_workspace_symbol`](Self::resolve_workspace_symbol).
    ///
    /// Records whose path cannot be expressed as a URI are skipped.
    ///
    /// # Errors
    ///
    /// Propagates query errors.
    pub fn provide_workspace_symbols(&self, query: &str) -> Result<Vec<WorkspaceSymbol>> {
        let records = self.query(query, MatchMode::Substring)?;
        Ok(records
            .iter()
            .filter_map(|record| match lsp::to_workspace_symbol(record) {
                Ok(symbol) => Some(symbol),
                Err(e) => {
                    warn!(symbol = %record.name, error = %e, "Skipping symbol");
                    None
                }
            })
            .collect())
    }

    /// `workspaceSymbol/resolve`: fill in the location of one symbol.
    #[must_use]
    pub fn resolve_workspace_symbol(&self, symbol: WorkspaceSymbol) -> WorkspaceSymbol {
        lsp::resolve_workspace_symbol(symbol)
    }

    /// Run `f` with read access to the index.
    pub fn with_index<T>(&self, f: impl FnOnce(&TagIndex) -> T) -> T {
        f(&self.lock())
    }
}
