//! Lazy resolution of symbol addresses into concrete positions.
//!
//! Queries hand out unresolved records. Only when the caller picks one does
//! the resolver compute where it lives:
//!
//! - **Line number**: `N` becomes line `N - 1`, column 0. No I/O.
//! - **Pattern**: the source file is read and searched for the first
//!   *literal* occurrence of the pattern text. The line is the number of
//!   newlines before the match.
//!
//! A pattern that no longer occurs in the file (the source changed after the
//! tags were generated) leaves the record unresolved rather than failing.

use std::fs;

use ctagsym_format::TargetAddress;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::types::{Position, SymbolRecord};

/// Resolve one record.
///
/// Already-resolved records are returned unchanged. A pattern that cannot be
/// found yields the record unchanged (still unresolved).
///
/// # Errors
///
/// Returns [`ResolveError::TargetFileUnreadable`] when a pattern address
/// points into a file that cannot be read.
pub fn resolve(record: &SymbolRecord) -> Result<SymbolRecord, ResolveError> {
    if record.is_resolved() {
        return Ok(record.clone());
    }

    match &record.address {
        TargetAddress::LineNumber(line) => {
            Ok(record.with_location(Position::line_start(line.saturating_sub(1))))
        }
        TargetAddress::Pattern(pattern) => {
            let bytes = fs::read(&record.source_path).map_err(|source| {
                ResolveError::TargetFileUnreadable {
                    path: record.source_path.clone(),
                    source,
                }
            })?;
            let content = String::from_utf8_lossy(&bytes);

            match find_line(&content, pattern) {
                Some(line) => Ok(record.with_location(Position::line_start(line))),
                None => {
                    debug!(
                        symbol = %record.name,
                        file = %record.source_path.display(),
                        "Pattern not found in source; leaving symbol unresolved"
                    );
                    Ok(record.clone())
                }
            }
        }
    }
}

/// Resolve one record, falling back to the unresolved record on failure.
#[must_use]
pub fn resolve_or_placeholder(record: &SymbolRecord) -> SymbolRecord {
    resolve(record).unwrap_or_else(|e| {
        warn!(symbol = %record.name, error = %e, "Unable to resolve symbol");
        record.clone()
    })
}

/// Resolve many records concurrently.
///
/// Each record is resolved independently; a failure leaves only that record
/// unresolved. Output order matches input order.
#[must_use]
pub fn resolve_all(records: &[SymbolRecord]) -> Vec<SymbolRecord> {
    records.par_iter().map(resolve_or_placeholder).collect()
}

/// Zero-based line of the first literal occurrence of `needle`.
fn find_line(content: &str, needle: &str) -> Option<u32> {
    let offset = content.find(needle)?;
    let newlines = content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count();
    Some(u32::try_from(newlines).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn pattern_record(path: &Path, pattern: &str) -> SymbolRecord {
        SymbolRecord::new(
            "sym",
            path.to_path_buf(),
            TargetAddress::Pattern(pattern.to_string()),
        )
    }

    #[test]
    fn line_number_needs_no_file() {
        let record = SymbolRecord::new(
            "foo",
            PathBuf::from("/does/not/exist.c"),
            TargetAddress::LineNumber(12),
        );

        let resolved = resolve(&record).unwrap();

        assert_eq!(resolved.location, Some(Position::new(11, 0)));
    }

    #[test]
    fn pattern_resolves_to_first_occurrence() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.c");
        fs::write(&file, "one\ntwo\nint x;\nfour\nint x;\n").unwrap();

        let resolved = resolve(&pattern_record(&file, "int x;")).unwrap();

        assert_eq!(resolved.location, Some(Position::new(2, 0)));
    }

    #[test]
    fn pattern_is_matched_literally() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.c");
        fs::write(&file, "a+b\nif (x.*y) {\n").unwrap();

        let resolved = resolve(&pattern_record(&file, "if (x.*y) {")).unwrap();

        assert_eq!(resolved.location, Some(Position::new(1, 0)));
    }

    #[test]
    fn crlf_files_count_lines_correctly() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.c");
        fs::write(&file, "one\r\ntwo\r\nthree\r\n").unwrap();

        let resolved = resolve(&pattern_record(&file, "three")).unwrap();

        assert_eq!(resolved.location, Some(Position::new(2, 0)));
    }

    #[test]
    fn missing_pattern_leaves_record_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.c");
        fs::write(&file, "nothing here\n").unwrap();
        let record = pattern_record(&file, "something");

        let resolved = resolve(&record).unwrap();

        assert_eq!(resolved, record);
    }

    #[test]
    fn unreadable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let record = pattern_record(&dir.path().join("gone.c"), "x");

        let err = resolve(&record).unwrap_err();

        assert!(matches!(err, ResolveError::TargetFileUnreadable { .. }));
        assert_eq!(resolve_or_placeholder(&record), record);
    }

    #[test]
    fn resolved_record_is_returned_as_is() {
        let record = SymbolRecord::new(
            "foo",
            PathBuf::from("/gone.c"),
            TargetAddress::Pattern("x".to_string()),
        )
        .with_location(Position::new(7, 0));

        assert_eq!(resolve(&record).unwrap(), record);
    }

    #[test]
    fn resolve_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.c");
        fs::write(&file, "x\ny\n").unwrap();
        let records = vec![
            pattern_record(&dir.path().join("gone.c"), "y"),
            pattern_record(&file, "y"),
        ];

        let resolved = resolve_all(&records);

        assert!(!resolved[0].is_resolved());
        assert_eq!(resolved[1].location, Some(Position::new(1, 0)));
    }
}
