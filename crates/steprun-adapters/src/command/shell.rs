//! Shell command runner using std::process.

use std::path::Path;
use std::process::{Command, Stdio};

use steprun_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandRunner},
    },
    error::SteprunResult,
};
use tracing::{debug, instrument};

/// What happens to the child's stdout/stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// Collected into [`CommandOutput`]; used for command placeholders.
    #[default]
    Capture,
    /// Streamed to the terminal; used for command actions.
    Inherit,
}

/// Runs commands through the platform shell (`sh -c` / `cmd /C`).
#[derive(Debug, Clone, Default)]
pub struct ShellCommandRunner {
    shell: Option<String>,
    stdio: StdioMode,
}

impl ShellCommandRunner {
    /// Captures output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams output to the terminal.
    pub fn inheriting() -> Self {
        Self {
            stdio: StdioMode::Inherit,
            ..Self::default()
        }
    }

    /// Use a specific shell, invoked as `<shell> -c <command>`.
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    fn command(&self, line: &str) -> Command {
        match &self.shell {
            Some(shell) => {
                let mut cmd = Command::new(shell);
                cmd.arg("-c").arg(line);
                cmd
            }
            None if cfg!(windows) => {
                let mut cmd = Command::new("cmd");
                cmd.arg("/C").arg(line);
                cmd
            }
            None => {
                let mut cmd = Command::new("sh");
                cmd.arg("-c").arg(line);
                cmd
            }
        }
    }
}

impl CommandRunner for ShellCommandRunner {
    #[instrument(skip(self), fields(stdio = ?self.stdio))]
    fn run(&self, command: &str, cwd: &Path) -> SteprunResult<CommandOutput> {
        let mut cmd = self.command(command);
        cmd.current_dir(cwd).stdin(Stdio::inherit());

        let spawn_error = |e: std::io::Error| ApplicationError::CommandSpawn {
            command: command.to_string(),
            reason: e.to_string(),
        };

        let output = match self.stdio {
            StdioMode::Capture => {
                let out = cmd.output().map_err(spawn_error)?;
                CommandOutput {
                    code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                }
            }
            StdioMode::Inherit => {
                let status = cmd
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(spawn_error)?;
                CommandOutput {
                    code: status.code(),
                    ..CommandOutput::default()
                }
            }
        };

        debug!(code = ?output.code, "Command finished");
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn captures_stdout_and_exit_code() {
        let temp = TempDir::new().unwrap();
        let out = ShellCommandRunner::new()
            .run("echo hello; echo oops >&2; exit 3", temp.path())
            .unwrap();

        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert!(!out.is_success());
    }

    #[test]
    fn runs_in_the_given_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker"), "").unwrap();

        let out = ShellCommandRunner::new().run("ls", temp.path()).unwrap();
        assert!(out.stdout.contains("marker"));
    }

    #[test]
    fn missing_directory_fails_to_spawn() {
        let err = ShellCommandRunner::new()
            .run("true", Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to run"));
    }
}
