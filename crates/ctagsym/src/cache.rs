//! Per-root tags cache.
//!
//! A [`RootCache`] owns the parsed symbols of one tags file together with the
//! metadata needed to decide whether the file changed since it was read.
//! Caches are never patched: when the file changes the whole cache is
//! rebuilt.
//!
//! ## Staleness
//!
//! The file's modification time is recorded *before* it is read, and a
//! cache is stale whenever the current modification time differs from the
//! recorded one, in either direction. A generator that rewrites the file
//! mid-parse, a `mv` of an older file into place, and a file appearing where
//! none existed all force the next check to rebuild.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ctagsym_format::{Warning, dedupe_tags, parse_tags};
use tracing::{debug, info, warn};

use crate::types::SymbolRecord;

/// Parsed contents of one tags file.
#[derive(Debug, Clone)]
pub struct RootCache {
    root: PathBuf,
    backing_file: PathBuf,
    loaded_at: SystemTime,
    source_modified: Option<SystemTime>,
    deduplicated: bool,
    entries: Vec<SymbolRecord>,
    format_version: Option<u32>,
    warnings: Vec<Warning>,
    read_error: Option<String>,
}

impl RootCache {
    /// Read and parse `backing_file`, resolving relative source paths
    /// against `root`.
    ///
    /// A tags file that cannot be read yields an empty cache bound to that
    /// path. Malformed lines are skipped and kept in [`warnings`](Self::warnings).
    #[must_use]
    pub fn rebuild(backing_file: &Path, root: &Path, dedupe: bool) -> Self {
        let loaded_at = SystemTime::now();
        let source_modified = modified_time(backing_file);

        let bytes = match fs::read(backing_file) {
            Ok(bytes) => bytes,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    debug!(
                        tags_file = %backing_file.display(),
                        "Tags file not found; providing no symbols"
                    );
                } else {
                    warn!(
                        tags_file = %backing_file.display(),
                        error = %e,
                        "Unable to read tags file; providing no symbols"
                    );
                }
                return Self {
                    read_error: Some(e.to_string()),
                    source_modified,
                    ..Self::empty(backing_file, root, loaded_at, dedupe)
                };
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        let parsed = parse_tags(&content, root);
        let tags = if dedupe {
            dedupe_tags(parsed.tags)
        } else {
            parsed.tags
        };
        let entries: Vec<SymbolRecord> = tags.into_iter().map(SymbolRecord::from).collect();

        info!(
            tags_file = %backing_file.display(),
            symbols = entries.len(),
            skipped = parsed.warnings.len(),
            format = ?parsed.format_version,
            "Loaded tags"
        );

        Self {
            root: root.to_path_buf(),
            backing_file: backing_file.to_path_buf(),
            loaded_at,
            source_modified,
            deduplicated: dedupe,
            entries,
            format_version: parsed.format_version,
            warnings: parsed.warnings,
            read_error: None,
        }
    }

    fn empty(backing_file: &Path, root: &Path, loaded_at: SystemTime, dedupe: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            backing_file: backing_file.to_path_buf(),
            loaded_at,
            source_modified: None,
            deduplicated: dedupe,
            entries: Vec::new(),
            format_version: None,
            warnings: Vec::new(),
            read_error: None,
        }
    }

    /// Decide whether this cache must be rebuilt to reflect `backing_file`.
    ///
    /// True when the cache was built from a different path, when the file's
    /// modification time no longer matches the one seen at load time, or
    /// when the file appeared or disappeared since. A file that is missing
    /// now and was missing then does not rebuild on every query.
    #[must_use]
    pub fn needs_rebuild(&self, backing_file: &Path) -> bool {
        if self.backing_file != backing_file {
            debug!(
                old = %self.backing_file.display(),
                new = %backing_file.display(),
                "Cache needs update: pointed to a new file"
            );
            return true;
        }

        let current = modified_time(backing_file);
        if current == self.source_modified {
            return false;
        }
        match current {
            Some(_) if self.source_modified.is_none() => {
                debug!(tags_file = %backing_file.display(), "Cache needs update: tags file appeared");
            }
            Some(_) => {
                debug!(tags_file = %backing_file.display(), "Cache needs update: out of date");
            }
            None => {
                debug!(tags_file = %backing_file.display(), "Cache needs update: tags file disappeared");
            }
        }
        true
    }

    /// The project root this cache belongs to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The tags file this cache was built from.
    #[must_use]
    pub fn backing_file(&self) -> &Path {
        &self.backing_file
    }

    /// When the read that produced this cache started.
    #[must_use]
    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    /// Whether duplicate `(path, name)` pairs were removed at load time.
    #[must_use]
    pub fn is_deduplicated(&self) -> bool {
        self.deduplicated
    }

    /// Symbols in tags-file order.
    #[must_use]
    pub fn entries(&self) -> &[SymbolRecord] {
        &self.entries
    }

    /// The `!_TAG_FILE_FORMAT` version, if the file declared one.
    #[must_use]
    pub fn format_version(&self) -> Option<u32> {
        self.format_version
    }

    /// Lines skipped while parsing.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Why the tags file could not be read, if it could not.
    #[must_use]
    pub fn read_error(&self) -> Option<&str> {
        self.read_error.as_deref()
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
