//! Reader for the ctags/exuberant-tags symbol file format.
//!
//! A tags file is line oriented and tab delimited. Every data line has the
//! shape `name<TAB>file<TAB>address`, where the address is either a 1-based
//! line number or an ex search command (`/^text$/` or `?^text$?`) that
//! locates the definition by its source text. Lines starting with `!_TAG_`
//! are pseudo-tags describing the file itself.
//!
//! This crate turns that text into typed values and never fails on bad input:
//! malformed lines are skipped and reported as [`Warning`]s.
//!
//! # Examples
//!
//! ```
//! use ctagsym_format::{parse_tags, TargetAddress};
//! use std::path::Path;
//!
//! let content = "!_TAG_FILE_FORMAT\t2\t/extended format/\n\
//!                main\tsrc/main.c\t/^int main(void)$/;\"\tf\n\
//!                VERSION\tsrc/version.h\t3\n";
//!
//! let parsed = parse_tags(content, Path::new("/project"));
//! assert_eq!(parsed.format_version, Some(2));
//! assert_eq!(parsed.tags.len(), 2);
//! assert_eq!(parsed.tags[0].address, TargetAddress::Pattern("int main(void)".to_string()));
//! assert_eq!(parsed.tags[1].address, TargetAddress::LineNumber(3));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod line;
pub mod warning;

pub use address::{TargetAddress, parse_address};
pub use error::AddressError;
pub use line::{
    ParsedLine, ParsedTags, PSEUDO_TAG_PREFIX, PseudoTag, SkipReason, Tag, dedupe_tags,
    parse_line, parse_tags,
};
pub use warning::Warning;
