//! The merged, queryable symbol index.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        TagIndex::refresh                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Phase 1 (Parallel):    rayon::par_iter_mut() staleness check │
//! │                         + rebuild, one task per root          │
//! │  Phase 2 (Sequential):  concatenate, dedupe, stable sort      │
//! │                         (only when something rebuilt)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each rebuild task owns its root's cache exclusively, and the shared
//! `entries` list is only replaced after every task has joined, so a query
//! never observes a partially merged view.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::cache::RootCache;
use crate::config::Settings;
use crate::error::Result;
use crate::query::{MatchMode, Matcher};
use crate::types::SymbolRecord;

/// What a call to [`TagIndex::refresh`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Roots whose tags file was (re)loaded, in root order.
    pub rebuilt: Vec<PathBuf>,
    /// Whether the merged entries were recomputed.
    pub changed: bool,
}

#[derive(Debug)]
struct RootSlot {
    root: PathBuf,
    cache: Option<RootCache>,
}

impl RootSlot {
    /// Rebuild this root's cache if needed. Returns the root when it rebuilt.
    fn refresh(&mut self, tags_file_name: &str, dedupe: bool) -> Option<PathBuf> {
        let backing_file = self.root.join(tags_file_name);
        let stale = match &self.cache {
            None => true,
            Some(cache) => cache.is_deduplicated() != dedupe || cache.needs_rebuild(&backing_file),
        };
        if !stale {
            return None;
        }
        self.cache = Some(RootCache::rebuild(&backing_file, &self.root, dedupe));
        Some(self.root.clone())
    }
}

#[derive(Debug, PartialEq, Eq)]
struct MergeKey {
    roots: Vec<PathBuf>,
    dedupe: bool,
}

/// Symbols from every configured root, merged and sorted by name.
///
/// `TagIndex` is plain owned state: create one per set of roots, call
/// [`query`](Self::query) or [`refresh`](Self::refresh) whenever the tags
/// files may have changed. Wrap it in a mutex (see
/// [`SymbolProvider`](crate::SymbolProvider)) to share it between threads.
#[derive(Debug, Default)]
pub struct TagIndex {
    slots: Vec<RootSlot>,
    entries: Vec<SymbolRecord>,
    merged: Option<MergeKey>,
}

impl TagIndex {
    /// Create an empty index. Nothing is read until the first refresh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every root's cache up to date and re-merge if anything changed.
    ///
    /// Roots are checked and rebuilt in parallel, or in turn when called from
    /// a rayon worker thread. The merged entries are recomputed when at least one root rebuilt or when the root list or the
    /// dedupe flag differ from the previous merge; otherwise they are left
    /// untouched.
    pub fn refresh(&mut self, roots: &[PathBuf], tags_file_name: &str, dedupe: bool) -> RefreshOutcome {
        self.sync_roots(roots);

        // A rayon worker blocked in `par_iter_mut` runs other queued jobs. When
        // the caller holds a lock around this index, one of those jobs may be
        // a query waiting on that same lock, so workers rebuild sequentially.
        let rebuilt: Vec<PathBuf> = if rayon::current_thread_index().is_some() {
            self.slots
                .iter_mut()
                .filter_map(|slot| slot.refresh(tags_file_name, dedupe))
                .collect()
        } else {
            self.slots
                .par_iter_mut()
                .filter_map(|slot| slot.refresh(tags_file_name, dedupe))
                .collect()
        };

        let key = MergeKey {
            roots: roots.to_vec(),
            dedupe,
        };
        if rebuilt.is_empty() && self.merged.as_ref() == Some(&key) {
            trace!("Tag caches unchanged; keeping merged entries");
            return RefreshOutcome {
                rebuilt,
                changed: false,
            };
        }

        self.entries = merge_entries(
            self.slots
                .iter()
                .filter_map(|slot| slot.cache.as_ref())
                .map(RootCache::entries),
            dedupe,
        );
        self.merged = Some(key);
        debug!(
            symbols = self.entries.len(),
            rebuilt = rebuilt.len(),
            roots = self.slots.len(),
            "Merged tag caches"
        );

        RefreshOutcome {
            rebuilt,
            changed: true,
        }
    }

    /// Keep caches of roots that are still configured, in the new order.
    fn sync_roots(&mut self, roots: &[PathBuf]) {
        if self.slots.iter().map(|slot| &slot.root).eq(roots.iter()) {
            return;
        }
        let mut previous: HashMap<PathBuf, Option<RootCache>> = self
            .slots
            .drain(..)
            .map(|slot| (slot.root, slot.cache))
            .collect();
        self.slots = roots
            .iter()
            .map(|root| RootSlot {
                root: root.clone(),
                cache: previous.remove(root).flatten(),
            })
            .collect();
    }

    /// Find symbols whose name matches `text`.
    ///
    /// Queries shorter than `minQueryLength` characters return nothing and do
    /// not touch the tags files. Otherwise the index is refreshed first, then
    /// filtered in name order and capped at `maxNumberOfSymbols`. Returned
    /// records are unresolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Query`](crate::Error::Query) if `mode` is
    /// [`MatchMode::Regex`] and `text` is not a valid regex.
    pub fn query(
        &mut self,
        roots: &[PathBuf],
        settings: &Settings,
        text: &str,
        mode: MatchMode,
    ) -> Result<Vec<SymbolRecord>> {
        if text.chars().count() < settings.min_query_length {
            trace!(
                query = text,
                min_query_length = settings.min_query_length,
                "Query too short; skipping"
            );
            return Ok(Vec::new());
        }

        let matcher = Matcher::new(text, mode)?;
        self.refresh(roots, &settings.tags_file_name, settings.hide_duplicate_tags);

        let limit = settings.result_limit().unwrap_or(usize::MAX);
        Ok(self
            .entries
            .iter()
            .filter(|entry| matcher.is_match(&entry.name))
            .take(limit)
            .cloned()
            .collect())
    }

    /// All merged symbols, sorted by name.
    #[must_use]
    pub fn entries(&self) -> &[SymbolRecord] {
        &self.entries
    }

    /// Loaded caches, in root order. Roots never refreshed are skipped.
    pub fn caches(&self) -> impl Iterator<Item = &RootCache> {
        self.slots.iter().filter_map(|slot| slot.cache.as_ref())
    }

    /// The cache for `root`, if it has been loaded.
    #[must_use]
    pub fn cache_for(&self, root: &Path) -> Option<&RootCache> {
        self.slots
            .iter()
            .find(|slot| slot.root == root)
            .and_then(|slot| slot.cache.as_ref())
    }
}

/// Concatenate per-root entries in root order, optionally drop repeated
/// `(source_path, name)` pairs, and sort by name.
///
/// The sort is stable and compares names byte by byte, so ties keep their
/// root-then-file-then-line order and the output is reproducible.
pub(crate) fn merge_entries<'a>(
    parts: impl IntoIterator<Item = &'a [SymbolRecord]>,
    dedupe: bool,
) -> Vec<SymbolRecord> {
    let mut seen = HashSet::new();
    let mut entries: Vec<SymbolRecord> = parts
        .into_iter()
        .flatten()
        .filter(|&record| !dedupe || seen.insert(record.identity()))
        .cloned()
        .collect();

    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    entries
}
