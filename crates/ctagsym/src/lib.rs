//! # ctagsym: Workspace Symbols from ctags Files
//!
//! ctagsym answers fuzzy symbol-name queries for a set of project roots by
//! reading the tags file each root keeps (as generated by Universal or
//! Exuberant Ctags), and resolves a chosen symbol to a concrete line only
//! when asked.
//!
//! ## Design
//!
//! - **Cache, then check** - each root's tags file is parsed once and re-read
//!   only when its modification time moves past the last load
//! - **Lazy positions** - search results carry the raw tags address; reading
//!   the source file to find a pattern happens on resolve
//! - **Best effort** - a missing tags file, a malformed line, or a vanished
//!   source file costs only that root, line, or symbol
//!
//! ## Quick Start
//!
//! ```no_run
//! use ctagsym::{MatchMode, Settings, SymbolProvider};
//! use std::path::PathBuf;
//!
//! let provider = SymbolProvider::new(vec![PathBuf::from("/path/to/project")], Settings::default());
//!
//! let results = provider.query("parse", MatchMode::Substring)?;
//! if let Some(first) = results.first() {
//!     let resolved = ctagsym::resolve(first)?;
//!     println!("{} at {:?}", resolved.name, resolved.location);
//! }
//! # Ok::<(), ctagsym::Error>(())
//! ```

#![forbid(unsafe_code)]

mod cache;
mod config;
mod error;
mod index;
pub mod lsp;
mod provider;
mod query;
pub mod regenerate;
mod resolver;
mod types;

pub use cache::RootCache;
pub use config::{
    DEFAULT_MIN_QUERY_LENGTH, DEFAULT_REGENERATE_COMMAND, DEFAULT_TAGS_FILE_NAME,
    SETTINGS_FILE_NAME, Settings,
};
pub use ctagsym_format::{TargetAddress, Warning};
pub use error::{Error, RegenerateError, ResolveError, Result};
pub use index::{RefreshOutcome, TagIndex};
pub use provider::SymbolProvider;
pub use query::{MatchMode, Matcher};
pub use regenerate::{CommandOutcome, CommandRunner, Regenerator, SaveOutcome, ShellRunner};
pub use resolver::{resolve, resolve_all, resolve_or_placeholder};
pub use types::{Position, SymbolRecord};
