//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! Every method receives fully resolved values; no port ever sees a
//! placeholder token it is expected to expand.

use std::path::Path;

use crate::error::SteprunResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `steprun_adapters::filesystem::LocalFilesystem` (production)
/// - `steprun_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> SteprunResult<()>;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> SteprunResult<String>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> SteprunResult<()>;

    /// Copy a file, or a directory recursively, to `dest`.
    ///
    /// Existing files under `dest` are overwritten; callers decide whether
    /// that is allowed.
    fn copy(&self, src: &Path, dest: &Path) -> SteprunResult<()>;

    /// Move `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> SteprunResult<()>;

    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> SteprunResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Result of a finished shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Port for running shell commands.
///
/// Implemented by:
/// - `steprun_adapters::command::ShellCommandRunner` (platform shell)
/// - `steprun_adapters::command::RecordingCommandRunner` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `command` through the shell in `cwd` and wait for it.
    ///
    /// A non-zero exit is not an error here; spawn failures are.
    fn run(&self, command: &str, cwd: &Path) -> SteprunResult<CommandOutput>;
}

/// Port for asking the user.
///
/// Implemented by:
/// - `steprun_cli::prompt::TerminalPrompter` (dialoguer)
/// - `steprun_cli::prompt::LinePrompter` (plain stdin)
/// - `steprun_adapters::prompt::ScriptedPrompter` (testing, piped input)
///
/// Prompt text, defaults and options arrive already resolved.
pub trait Prompter: Send + Sync {
    /// Free text. An empty reply takes `default` when there is one.
    fn input(&self, prompt: &str, default: Option<&str>) -> SteprunResult<String>;

    /// Yes/no.
    fn confirm(&self, prompt: &str, default: Option<bool>) -> SteprunResult<bool>;

    /// One option; returns its index.
    fn select(&self, prompt: &str, options: &[String], default: Option<usize>)
    -> SteprunResult<usize>;

    /// Any number of options; returns indices in selection order.
    fn multiselect(
        &self,
        prompt: &str,
        options: &[String],
        defaults: &[bool],
    ) -> SteprunResult<Vec<usize>>;
}
