//! Parsing of the address field of a tag line.
//!
//! ctags writes one of three address forms:
//!
//! | Form | Example | Result |
//! |------|---------|--------|
//! | Line number | `42` or `42;"` | [`TargetAddress::LineNumber`] |
//! | Forward search | `/^int main(void)$/;"` | [`TargetAddress::Pattern`] |
//! | Backward search | `?^int main(void)$?` | [`TargetAddress::Pattern`] |
//!
//! Search patterns are kept as plain text and later located with a literal
//! substring search. They are never compiled as regular expressions, so
//! source lines full of regex metacharacters need no escaping.

use serde::{Deserialize, Serialize};

use crate::error::AddressError;

/// Where a symbol lives inside its source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TargetAddress {
    /// A 1-based line number.
    LineNumber(u32),
    /// A literal line of source text to search for.
    Pattern(String),
}

impl std::fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LineNumber(line) => write!(f, "line {line}"),
            Self::Pattern(text) => write!(f, "/{text}/"),
        }
    }
}

/// Parse the third field of a tag line into a [`TargetAddress`].
///
/// Search commands that do not have the usual `/.../` shape (no closing
/// delimiter, or junk after it) are tolerated: everything after the opening
/// delimiter becomes the pattern text verbatim.
///
/// # Errors
///
/// Returns an [`AddressError`] when the field is empty, when a search pattern
/// has no text, or when a bare address is not a positive integer.
///
/// # Examples
///
/// ```
/// use ctagsym_format::{parse_address, TargetAddress};
///
/// assert_eq!(parse_address("12").unwrap(), TargetAddress::LineNumber(12));
/// assert_eq!(
///     parse_address("/^fn run() {$/;\"\tf").unwrap(),
///     TargetAddress::Pattern("fn run() {".to_string()),
/// );
/// assert!(parse_address("main").is_err());
/// ```
pub fn parse_address(field: &str) -> Result<TargetAddress, AddressError> {
    let field = field.trim_end_matches(['\r', '\n']);
    match field.chars().next() {
        None => Err(AddressError::Empty),
        Some(delimiter @ ('/' | '?')) => parse_search(field, delimiter),
        Some(_) => parse_line_number(field),
    }
}

fn parse_search(field: &str, delimiter: char) -> Result<TargetAddress, AddressError> {
    let body = &field[delimiter.len_utf8()..];

    let text = match split_search_body(body, delimiter) {
        Some(inner) => unescape(strip_anchors(inner), delimiter),
        None => body.to_string(),
    };

    if text.is_empty() {
        return Err(AddressError::EmptyPattern(field.to_string()));
    }
    Ok(TargetAddress::Pattern(text))
}

/// Find the closing delimiter of a search command and return the text
/// between the delimiters.
///
/// Returns `None` when there is no unescaped closing delimiter or when it is
/// followed by something other than the `;"` extension-field marker.
fn split_search_body(body: &str, delimiter: char) -> Option<&str> {
    let mut escaped = false;
    for (idx, ch) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == delimiter {
            let trailing = body[idx + ch.len_utf8()..].trim_start();
            return (trailing.is_empty() || trailing.starts_with(';')).then_some(&body[..idx]);
        }
    }
    None
}

fn strip_anchors(inner: &str) -> &str {
    let inner = inner.strip_prefix('^').unwrap_or(inner);
    // ctags drops the trailing `$` when it truncates very long lines.
    match inner.strip_suffix('$') {
        Some(stripped) if !stripped.ends_with('\\') => stripped,
        _ => inner,
    }
}

/// Undo the escaping ctags applies inside search commands (`\\` and the
/// delimiter itself). Other backslash sequences are left untouched.
fn unescape(text: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == delimiter {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

fn parse_line_number(field: &str) -> Result<TargetAddress, AddressError> {
    // Extended format appends `;"` plus extension fields to bare numbers too.
    let number = field.split_once(';').map_or(field, |(n, _)| n).trim();
    match number.parse::<u32>() {
        Ok(line) if line > 0 => Ok(TargetAddress::LineNumber(line)),
        _ => Err(AddressError::InvalidLineNumber(field.to_string())),
    }
}
