//! Regeneration of tags files through an external command.
//!
//! The command is an operator-supplied template with two placeholders,
//! `${workspaceFolder}` and `${tagsFile}`, run through the platform shell.
//! Running it is delegated to a [`CommandRunner`] so hosts (and tests) can
//! substitute their own process execution.
//!
//! Failures are reported, never retried. The next regeneration happens only
//! when it is requested again or the next file is saved.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use crate::config::{Settings, TAGS_FILE_PLACEHOLDER, WORKSPACE_FOLDER_PLACEHOLDER};
use crate::error::RegenerateError;

/// Exit code shells use for "command not found".
const COMMAND_NOT_FOUND_EXIT: i32 = 127;

/// Trailing stderr kept for error messages.
const MAX_STDERR_CHARS: usize = 400;

const DEFAULT_TOOL: &str = "ctags";

const DEFAULT_TOOL_INSTALL_HINT: &str = "Install Universal Ctags (https://ctags.io) and make sure `ctags` is on your PATH, or set `regenerateCommand`.";

/// How an external command finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Standard error output.
    pub stderr: String,
}

impl CommandOutcome {
    /// Returns `true` for a zero exit code.
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a shell command line to completion.
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `cwd` as the working directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the process could not be started.
    fn run(&self, command: &str, cwd: &Path) -> io::Result<CommandOutcome>;
}

/// Runs commands through `sh -c` (`cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, cwd: &Path) -> io::Result<CommandOutcome> {
        #[cfg(windows)]
        let mut cmd = {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        };
        #[cfg(not(windows))]
        let mut cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        };

        let output = cmd
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;

        Ok(CommandOutcome {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Substitute the root and tags file path into a command template.
///
/// The template itself reaches the shell verbatim. On Unix the substituted
/// paths have `\`, `"`, `$` and `` ` `` backslash-escaped, so a placeholder
/// inside double quotes (as in the default template) always expands to the
/// literal path. A placeholder outside quotes is still subject to word
/// splitting.
///
/// # Examples
///
/// ```
/// use ctagsym::regenerate::expand_command;
/// use std::path::Path;
///
/// let cmd = expand_command(
///     "ctags -R -f ${tagsFile} ${workspaceFolder}",
///     Path::new("/work"),
///     Path::new("/work/.tags"),
/// );
/// assert_eq!(cmd, "ctags -R -f /work/.tags /work");
/// ```
#[must_use]
pub fn expand_command(template: &str, root: &Path, tags_file: &Path) -> String {
    template
        .replace(WORKSPACE_FOLDER_PLACEHOLDER, &escape_for_shell(&root.to_string_lossy()))
        .replace(TAGS_FILE_PLACEHOLDER, &escape_for_shell(&tags_file.to_string_lossy()))
}

#[cfg(not(windows))]
fn escape_for_shell(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// `cmd /C` has no backslash escapes, and `"` cannot occur in Windows paths.
#[cfg(windows)]
fn escape_for_shell(value: &str) -> String {
    value.to_string()
}

/// The innermost configured root that contains `path`.
#[must_use]
pub fn root_for_saved_file<'a>(roots: &'a [PathBuf], path: &Path) -> Option<&'a Path> {
    roots
        .iter()
        .filter(|root| path.starts_with(root))
        .max_by_key(|root| root.components().count())
        .map(PathBuf::as_path)
}

/// What the save hook did.
#[derive(Debug)]
pub enum SaveOutcome {
    /// `regenerateOnSave` is off.
    Disabled,
    /// The saved file is outside every configured root.
    OutsideRoots,
    /// The saved file is the tags file itself.
    TagsFileSaved,
    /// Regeneration of the owning root started on a background thread.
    Scheduled {
        /// The root being regenerated.
        root: PathBuf,
        /// Joins to the regeneration result.
        handle: JoinHandle<Result<(), RegenerateError>>,
    },
}

/// Builds and runs regeneration commands for project roots.
#[derive(Debug)]
pub struct Regenerator<R = ShellRunner> {
    runner: Arc<R>,
    command_template: String,
    tags_file_name: String,
    default_command: bool,
    regenerate_on_save: bool,
}

impl<R> Clone for Regenerator<R> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            command_template: self.command_template.clone(),
            tags_file_name: self.tags_file_name.clone(),
            default_command: self.default_command,
            regenerate_on_save: self.regenerate_on_save,
        }
    }
}

impl<R: CommandRunner> Regenerator<R> {
    /// Create a regenerator from the user's settings.
    #[must_use]
    pub fn new(runner: R, settings: &Settings) -> Self {
        Self {
            runner: Arc::new(runner),
            command_template: settings.regenerate_command.clone(),
            tags_file_name: settings.tags_file_name.clone(),
            default_command: settings.uses_default_command(),
            regenerate_on_save: settings.regenerate_on_save,
        }
    }

    /// The fully expanded command for `root`.
    #[must_use]
    pub fn command_for(&self, root: &Path) -> String {
        expand_command(&self.command_template, root, &root.join(&self.tags_file_name))
    }

    /// Regenerate the tags file of one root and wait for the command.
    ///
    /// # Errors
    ///
    /// Returns [`RegenerateError::ToolNotInstalled`] when the default command
    /// fails because `ctags` is missing, [`RegenerateError::SpawnFailed`] when
    /// the shell cannot be started, and [`RegenerateError::CommandFailed`] for
    /// any other unsuccessful exit.
    pub fn regenerate(&self, root: &Path) -> Result<(), RegenerateError> {
        let command = self.command_for(root);
        debug!(root = %root.display(), command = %command, "Regenerating tags");

        let outcome = match self.runner.run(&command, root) {
            Ok(outcome) => outcome,
            Err(e) if self.default_command && e.kind() == io::ErrorKind::NotFound => {
                return Err(self.tool_not_installed());
            }
            Err(source) => return Err(RegenerateError::SpawnFailed { command, source }),
        };

        if outcome.success() {
            info!(root = %root.display(), "Regenerated tags");
            return Ok(());
        }
        if self.default_command && outcome.code == Some(COMMAND_NOT_FOUND_EXIT) {
            return Err(self.tool_not_installed());
        }
        Err(RegenerateError::CommandFailed {
            command,
            code: outcome.code,
            stderr: tail(outcome.stderr.trim(), MAX_STDERR_CHARS),
            custom: !self.default_command,
        })
    }

    fn tool_not_installed(&self) -> RegenerateError {
        RegenerateError::ToolNotInstalled {
            tool: DEFAULT_TOOL.to_string(),
            install_hint: DEFAULT_TOOL_INSTALL_HINT,
        }
    }

    /// Regenerate every root in turn. Each root reports its own result.
    pub fn regenerate_all(&self, roots: &[PathBuf]) -> Vec<(PathBuf, Result<(), RegenerateError>)> {
        roots
            .iter()
            .map(|root| {
                let result = self.regenerate(root);
                if let Err(e) = &result {
                    warn!(root = %root.display(), error = %e, "Tags regeneration failed");
                }
                (root.clone(), result)
            })
            .collect()
    }
}

impl<R: CommandRunner + 'static> Regenerator<R> {
    /// Regenerate one root on a background thread without waiting.
    ///
    /// Failures are logged at `warn` level and returned through the handle.
    pub fn spawn(&self, root: PathBuf) -> JoinHandle<Result<(), RegenerateError>> {
        let regenerator = self.clone();
        std::thread::spawn(move || {
            let result = regenerator.regenerate(&root);
            if let Err(e) = &result {
                warn!(root = %root.display(), error = %e, "Tags regeneration failed");
            }
            result
        })
    }

    /// React to a saved file: start regenerating the root that contains it
    /// when `regenerateOnSave` is enabled. Returns without waiting for the
    /// command.
    ///
    /// Saving the tags file itself never triggers a regeneration.
    pub fn on_file_saved(&self, roots: &[PathBuf], saved: &Path) -> SaveOutcome {
        if !self.regenerate_on_save {
            return SaveOutcome::Disabled;
        }
        let Some(root) = root_for_saved_file(roots, saved) else {
            debug!(file = %saved.display(), "Saved file is outside all roots");
            return SaveOutcome::OutsideRoots;
        };
        if saved == root.join(&self.tags_file_name) {
            return SaveOutcome::TagsFileSaved;
        }

        SaveOutcome::Scheduled {
            root: root.to_path_buf(),
            handle: self.spawn(root.to_path_buf()),
        }
    }
}

fn tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max_chars)).collect()
}
