//! Domain types for the symbol index.
//!
//! - **`SymbolRecord`**: one symbol from a tags file, possibly resolved
//! - **`Position`**: a concrete zero-based location inside a source file
//!
//! Records are values. Resolution never mutates a record in place, it
//! returns a new one with [`SymbolRecord::location`] filled in, so the
//! merged index can hand out clones to concurrent resolvers freely.

use std::path::{Path, PathBuf};

use ctagsym_format::{Tag, TargetAddress};
use serde::{Deserialize, Serialize};

/// A zero-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line.
    pub line: u32,
    /// Zero-based column.
    pub column: u32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The first column of a zero-based line.
    #[must_use]
    pub const fn line_start(line: u32) -> Self {
        Self::new(line, 0)
    }
}

impl From<Position> for lsp_types::Position {
    fn from(pos: Position) -> Self {
        Self::new(pos.line, pos.column)
    }
}

/// One symbol known to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Symbol name.
    pub name: String,
    /// Enclosing scope. Tags files are read without scope fields, so this is
    /// always empty.
    pub container_name: String,
    /// Absolute path of the defining file.
    pub source_path: PathBuf,
    /// Where the symbol sits in `source_path`, as written in the tags file.
    pub address: TargetAddress,
    /// Concrete location, filled in by the resolver.
    pub location: Option<Position>,
}

impl SymbolRecord {
    /// Create an unresolved record.
    #[must_use]
    pub fn new(name: impl Into<String>, source_path: PathBuf, address: TargetAddress) -> Self {
        Self {
            name: name.into(),
            container_name: String::new(),
            source_path,
            address,
            location: None,
        }
    }

    /// Returns `true` once the resolver has produced a concrete location.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    /// A copy of this record pointing at `location`.
    #[must_use]
    pub fn with_location(&self, location: Position) -> Self {
        Self {
            location: Some(location),
            ..self.clone()
        }
    }

    /// The `(source_path, name)` pair used for duplicate detection.
    #[must_use]
    pub fn identity(&self) -> (&Path, &str) {
        (&self.source_path, &self.name)
    }
}

impl From<Tag> for SymbolRecord {
    fn from(tag: Tag) -> Self {
        Self::new(tag.name, tag.path, tag.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_converts_to_unresolved_record() {
        let record = SymbolRecord::from(Tag {
            name: "main".to_string(),
            path: PathBuf::from("/p/main.c"),
            address: TargetAddress::LineNumber(3),
        });

        assert_eq!(record.name, "main");
        assert!(record.container_name.is_empty());
        assert!(!record.is_resolved());
    }

    #[test]
    fn with_location_leaves_original_untouched() {
        let record = SymbolRecord::new("x", PathBuf::from("/p/x.c"), TargetAddress::LineNumber(9));

        let resolved = record.with_location(Position::line_start(8));

        assert!(!record.is_resolved());
        assert_eq!(resolved.location, Some(Position::new(8, 0)));
        assert_eq!(resolved.identity(), record.identity());
    }

    #[test]
    fn position_converts_to_lsp() {
        let pos: lsp_types::Position = Position::new(4, 2).into();
        assert_eq!(pos.line, 4);
        assert_eq!(pos.character, 2);
    }
}
