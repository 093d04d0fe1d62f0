//! Parsing of whole tag lines and tags files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use crate::address::{TargetAddress, parse_address};
use crate::error::AddressError;
use crate::warning::Warning;

/// Prefix shared by all pseudo-tag (metadata) lines.
pub const PSEUDO_TAG_PREFIX: &str = "!_TAG_";

const FILE_FORMAT_PSEUDO_TAG: &str = "FILE_FORMAT";

/// One symbol definition read from a tags file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Symbol name as written by the tag generator.
    pub name: String,
    /// Absolute path of the file that defines the symbol.
    pub path: PathBuf,
    /// Where the definition sits inside `path`.
    pub address: TargetAddress,
}

/// A `!_TAG_` metadata line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoTag {
    /// `!_TAG_FILE_FORMAT`: the tags file format version (1 or 2).
    FileFormat(u32),
    /// Any other pseudo-tag. Recognized so it is never mistaken for a symbol.
    Other {
        /// Name without the `!_TAG_` prefix, e.g. `PROGRAM_NAME`.
        name: String,
        /// The first value field.
        value: String,
    },
}

/// Why a non-blank line produced no tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer than three tab-separated fields, or an empty name or file.
    TooFewFields,
    /// The address field could not be parsed.
    MalformedAddress(AddressError),
}

/// The outcome of parsing a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// A symbol definition.
    Tag(Tag),
    /// A metadata line.
    Pseudo(PseudoTag),
    /// An empty or whitespace-only line.
    Blank,
    /// A line that was rejected.
    Skipped(SkipReason),
}

/// Parse one line of a tags file.
///
/// Relative file names are joined onto `root`; absolute ones are kept as-is.
/// Everything after the second tab is the address, so extension fields that
/// follow a `;"` marker travel with it and are discarded by the address
/// parser.
///
/// # Examples
///
/// ```
/// use ctagsym_format::{parse_line, ParsedLine, TargetAddress};
/// use std::path::Path;
///
/// let ParsedLine::Tag(tag) = parse_line("foo\tsrc/a.c\t12", Path::new("/work")) else {
///     panic!("expected a tag");
/// };
/// assert_eq!(tag.name, "foo");
/// assert_eq!(tag.path, Path::new("/work/src/a.c"));
/// assert_eq!(tag.address, TargetAddress::LineNumber(12));
/// ```
#[must_use]
pub fn parse_line(line: &str, root: &Path) -> ParsedLine {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return ParsedLine::Blank;
    }

    if let Some(rest) = line.strip_prefix(PSEUDO_TAG_PREFIX) {
        return ParsedLine::Pseudo(parse_pseudo_tag(rest));
    }

    let mut fields = line.splitn(3, '\t');
    let (Some(name), Some(file), Some(address)) = (fields.next(), fields.next(), fields.next())
    else {
        return ParsedLine::Skipped(SkipReason::TooFewFields);
    };
    if name.is_empty() || file.is_empty() {
        return ParsedLine::Skipped(SkipReason::TooFewFields);
    }

    match parse_address(address) {
        Ok(address) => ParsedLine::Tag(Tag {
            name: name.to_string(),
            path: resolve_source_path(root, file),
            address,
        }),
        Err(e) => ParsedLine::Skipped(SkipReason::MalformedAddress(e)),
    }
}

fn parse_pseudo_tag(rest: &str) -> PseudoTag {
    let mut fields = rest.split('\t');
    let name = fields.next().unwrap_or_default();
    let value = fields.next().unwrap_or_default();

    if name == FILE_FORMAT_PSEUDO_TAG {
        if let Ok(version) = value.trim().parse() {
            return PseudoTag::FileFormat(version);
        }
    }
    PseudoTag::Other {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn resolve_source_path(root: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Everything extracted from one tags file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTags {
    /// Tags in file order.
    pub tags: Vec<Tag>,
    /// Value of the `!_TAG_FILE_FORMAT` pseudo-tag, if present.
    ///
    /// Informational only: resolution is driven by each tag's address kind.
    pub format_version: Option<u32>,
    /// Lines that were skipped.
    pub warnings: Vec<Warning>,
}

/// Parse the full text of a tags file.
///
/// Lines are split on `\n` and `\r\n`. Malformed lines are skipped and
/// reported in [`ParsedTags::warnings`]; parsing always runs to the end.
#[must_use]
pub fn parse_tags(content: &str, root: &Path) -> ParsedTags {
    let mut parsed = ParsedTags::default();

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        match parse_line(line, root) {
            ParsedLine::Tag(tag) => parsed.tags.push(tag),
            ParsedLine::Pseudo(PseudoTag::FileFormat(version)) => {
                parsed.format_version = Some(version);
            }
            ParsedLine::Pseudo(PseudoTag::Other { .. }) | ParsedLine::Blank => {}
            ParsedLine::Skipped(SkipReason::TooFewFields) => {
                trace!(line_number, "Dropping tag line with fewer than 3 fields");
                parsed.warnings.push(Warning::MalformedLine {
                    line_number,
                    reason: "expected name, file and address separated by tabs".to_string(),
                });
            }
            ParsedLine::Skipped(SkipReason::MalformedAddress(error)) => {
                warn!(line_number, error = %error, "Skipping tag with malformed address");
                parsed
                    .warnings
                    .push(Warning::MalformedAddress { line_number, error });
            }
        }
    }

    parsed
}

/// Drop every tag whose `(path, name)` pair was already seen, keeping the
/// first occurrence.
#[must_use]
pub fn dedupe_tags(mut tags: Vec<Tag>) -> Vec<Tag> {
    let mut seen = HashSet::new();
    tags.retain(|tag| seen.insert((tag.path.clone(), tag.name.clone())));
    tags
}
