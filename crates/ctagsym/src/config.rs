//! Settings for the symbol index.
//!
//! Settings live in a YAML file at the root of the first project folder.
//! Keys use the host editor's camelCase spelling and every key is optional:
//!
//! ```yaml
//! tagsFileName: .tags
//! minQueryLength: 2
//! hideDuplicateTags: true
//! maxNumberOfSymbols: 200
//! regenerateOnSave: true
//! regenerateCommand: ctags -R -f "${tagsFile}" "${workspaceFolder}"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the settings file looked up in a project root
pub const SETTINGS_FILE_NAME: &str = ".ctagsym.yaml";

/// Tags file name used when none is configured
pub const DEFAULT_TAGS_FILE_NAME: &str = ".tags";

/// Shortest query that triggers a search by default
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 2;

/// Command used to regenerate tags when none is configured
pub const DEFAULT_REGENERATE_COMMAND: &str = r#"ctags -R -f "${tagsFile}" "${workspaceFolder}""#;

/// Placeholder replaced by the project root in `regenerateCommand`
pub const WORKSPACE_FOLDER_PLACEHOLDER: &str = "${workspaceFolder}";

/// Placeholder replaced by the full tags file path in `regenerateCommand`
pub const TAGS_FILE_PLACEHOLDER: &str = "${tagsFile}";

/// User-facing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Tags file name, relative to each project root.
    pub tags_file_name: String,

    /// Queries shorter than this return nothing without touching the index.
    pub min_query_length: usize,

    /// Collapse symbols that share a name and a source file.
    pub hide_duplicate_tags: bool,

    /// Cap on returned symbols; 0 means unlimited.
    pub max_number_of_symbols: usize,

    /// Regenerate the owning root's tags file after a file is saved.
    pub regenerate_on_save: bool,

    /// Shell command template used to regenerate a tags file.
    pub regenerate_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tags_file_name: DEFAULT_TAGS_FILE_NAME.to_string(),
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
            hide_duplicate_tags: false,
            max_number_of_symbols: 0,
            regenerate_on_save: false,
            regenerate_command: DEFAULT_REGENERATE_COMMAND.to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid YAML or invalid values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load `.ctagsym.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn discover(root: &Path) -> Result<Self> {
        let path = root.join(SETTINGS_FILE_NAME);
        match Self::load(&path) {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.tags_file_name.trim().is_empty() {
            return Err(Error::Config("tagsFileName must not be empty".to_string()));
        }
        if self.regenerate_command.trim().is_empty() {
            return Err(Error::Config(
                "regenerateCommand must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full path of the tags file for `root`.
    #[must_use]
    pub fn tags_file(&self, root: &Path) -> PathBuf {
        root.join(&self.tags_file_name)
    }

    /// Maximum number of query results, `None` when unlimited.
    #[must_use]
    pub fn result_limit(&self) -> Option<usize> {
        (self.max_number_of_symbols > 0).then_some(self.max_number_of_symbols)
    }

    /// Returns `true` when `regenerateCommand` has not been customized.
    #[must_use]
    pub fn uses_default_command(&self) -> bool {
        self.regenerate_command == DEFAULT_REGENERATE_COMMAND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml("\n  \n").unwrap(), Settings::default());
    }

    #[test]
    fn camel_case_keys_are_read() {
        let settings = Settings::from_yaml(
            "tagsFileName: tags\n\
             minQueryLength: 0\n\
             hideDuplicateTags: true\n\
             maxNumberOfSymbols: 50\n\
             regenerateOnSave: true\n\
             regenerateCommand: mytags ${workspaceFolder}\n",
        )
        .unwrap();

        assert_eq!(settings.tags_file_name, "tags");
        assert_eq!(settings.min_query_length, 0);
        assert!(settings.hide_duplicate_tags);
        assert_eq!(settings.result_limit(), Some(50));
        assert!(settings.regenerate_on_save);
        assert!(!settings.uses_default_command());
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let settings = Settings::from_yaml("hideDuplicateTags: true\n").unwrap();

        assert_eq!(settings.tags_file_name, DEFAULT_TAGS_FILE_NAME);
        assert_eq!(settings.min_query_length, DEFAULT_MIN_QUERY_LENGTH);
        assert_eq!(settings.result_limit(), None);
        assert!(settings.uses_default_command());
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let err = Settings::from_yaml("minQueryLength: [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn wrong_type_is_a_config_error() {
        let err = Settings::from_yaml("minQueryLength: lots\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_tags_file_name_is_rejected() {
        let err = Settings::from_yaml("tagsFileName: ''\n").unwrap_err();
        assert!(err.to_string().contains("tagsFileName"));
    }

    #[test]
    fn discover_without_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::discover(dir.path()).unwrap(), Settings::default());
    }

    #[test]
    fn discover_reads_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE_NAME), "tagsFileName: TAGS\n").unwrap();

        let settings = Settings::discover(dir.path()).unwrap();

        assert_eq!(settings.tags_file(dir.path()), dir.path().join("TAGS"));
    }
}
