//! Error types for tags-file parsing.

use thiserror::Error;

/// Why an address field could not be turned into a [`TargetAddress`].
///
/// These never abort parsing of a whole file. The offending line is
/// skipped and the error is reported as a [`Warning`](crate::Warning).
///
/// [`TargetAddress`]: crate::TargetAddress
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The address field was empty.
    #[error("empty address")]
    Empty,

    /// The address was neither a search pattern nor a positive line number.
    #[error("invalid line number '{0}'")]
    InvalidLineNumber(String),

    /// The search pattern contained no text once delimiters were removed.
    #[error("empty search pattern in '{0}'")]
    EmptyPattern(String),
}
