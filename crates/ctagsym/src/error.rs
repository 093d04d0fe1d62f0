//! Error types for ctagsym operations.
//!
//! Errors are split by how far they are allowed to travel:
//!
//! - **`Error`**: returned to the caller (bad settings, bad query regex,
//!   I/O outside the index)
//! - **`ResolveError`**: local to one symbol; the caller falls back to the
//!   unresolved record
//! - **`RegenerateError`**: local to one root; surfaced as a warning, never
//!   retried
//!
//! A missing or corrupt tags file is not an error at all. It degrades to
//! "no symbols from this root" inside the cache.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for ctagsym operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for ctagsym operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid settings file or argument
    #[error("configuration error: {0}")]
    Config(String),

    /// The query could not be compiled into a matcher
    #[error("invalid query: {0}")]
    Query(#[from] regex::Error),

    /// A symbol could not be resolved
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Tags regeneration failed
    #[error(transparent)]
    Regenerate(#[from] RegenerateError),

    /// A path could not be expressed as a file URI
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A symbol payload could not be encoded as JSON
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to turn a symbol's address into a concrete position.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The file the symbol points at could not be read.
    #[error("cannot read {}: {source}", path.display())]
    TargetFileUnreadable {
        /// The symbol's source file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failure to regenerate a tags file.
#[derive(Debug, Error)]
pub enum RegenerateError {
    /// The default tag generator is not installed.
    #[error("{tool} is not installed or not on PATH")]
    ToolNotInstalled {
        /// The program the default command runs.
        tool: String,
        /// How to install it.
        install_hint: &'static str,
    },

    /// The command ran and exited unsuccessfully.
    #[error("tags regeneration failed: `{command}` {}{}", describe_exit(*code), describe_stderr(stderr))]
    CommandFailed {
        /// The expanded command line.
        command: String,
        /// Exit code, `None` if the process was killed by a signal.
        code: Option<i32>,
        /// Trailing standard error output.
        stderr: String,
        /// Whether the command came from a user-supplied template.
        custom: bool,
    },

    /// The command could not be started.
    #[error("failed to start tags regeneration `{command}`: {source}")]
    SpawnFailed {
        /// The expanded command line.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RegenerateError {
    /// A hint telling the user what to change, if one applies.
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolNotInstalled { install_hint, .. } => Some(*install_hint),
            Self::CommandFailed { custom: true, .. } | Self::SpawnFailed { .. } => {
                Some("Check the `regenerateCommand` setting.")
            }
            Self::CommandFailed { custom: false, .. } => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
