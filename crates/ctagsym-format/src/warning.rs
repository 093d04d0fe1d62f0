//! Non-fatal problems found while reading a tags file.
//!
//! A tags file is regenerated by external tools and may be truncated,
//! hand-edited, or written by a generator with its own quirks. None of that
//! should cost the user every other symbol in the file, so problems are
//! recorded as [`Warning`]s and the offending line is skipped.

use crate::error::AddressError;

/// A non-fatal warning that occurred while parsing a tags file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A data line did not have the `name<TAB>file<TAB>address` shape.
    MalformedLine {
        /// The 1-based line number in the tags file.
        line_number: usize,
        /// Why the line was rejected.
        reason: String,
    },

    /// A data line had an address that could not be parsed.
    MalformedAddress {
        /// The 1-based line number in the tags file.
        line_number: usize,
        /// The address parsing failure.
        error: AddressError,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctagsym_format::Warning;
    ///
    /// let warning = Warning::MalformedLine {
    ///     line_number: 42,
    ///     reason: "expected 3 tab-separated fields".to_string(),
    /// };
    /// assert_eq!(warning.line_number(), 42);
    /// ```
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedLine { line_number, .. } | Self::MalformedAddress { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedLine { .. } => "malformed_line",
            Self::MalformedAddress { .. } => "malformed_address",
        }
    }

    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedLine {
                line_number,
                reason,
            } => format!("line {line_number}: malformed tag line: {reason}"),
            Self::MalformedAddress { line_number, error } => {
                format!("line {line_number}: malformed address: {error}")
            }
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::error::Error for Warning {}
