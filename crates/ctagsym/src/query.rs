//! Name matching for symbol queries.

use regex::{Regex, RegexBuilder};

/// How query text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive substring match.
    #[default]
    Substring,
    /// Case-insensitive regular expression, unanchored.
    Regex,
}

/// A compiled query.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Lowercased needle.
    Substring(String),
    /// Case-insensitive regex.
    Regex(Regex),
}

impl Matcher {
    /// Compile `text` according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns the regex error when `mode` is [`MatchMode::Regex`] and `text`
    /// is not a valid pattern.
    pub fn new(text: &str, mode: MatchMode) -> Result<Self, regex::Error> {
        match mode {
            MatchMode::Substring => Ok(Self::Substring(text.to_lowercase())),
            MatchMode::Regex => RegexBuilder::new(text)
                .case_insensitive(true)
                .build()
                .map(Self::Regex),
        }
    }

    /// Returns `true` if `name` matches.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Substring(needle) => name.to_lowercase().contains(needle.as_str()),
            Self::Regex(re) => re.is_match(name),
        }
    }
}
