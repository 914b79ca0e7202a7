//! Command runner that records instead of executing (testing, previews).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use steprun_core::{
    application::{
        ApplicationError,
        ports::{CommandOutput, CommandRunner},
    },
    error::SteprunResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCommand {
    pub command: String,
    pub cwd: PathBuf,
}

/// Records every command and answers with a canned output.
///
/// Unknown commands succeed with empty output. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingCommandRunner {
    log: Arc<Mutex<Vec<RecordedCommand>>>,
    responses: Arc<Mutex<HashMap<String, CommandOutput>>>,
}

impl RecordingCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `command` with `output`.
    pub fn respond(self, command: impl Into<String>, output: CommandOutput) -> Self {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(command.into(), output);
        }
        self
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingCommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> SteprunResult<CommandOutput> {
        self.log
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned("command log"))?
            .push(RecordedCommand {
                command: command.to_string(),
                cwd: cwd.to_path_buf(),
            });

        let responses = self
            .responses
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned("command responses"))?;
        Ok(responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandOutput::success("")))
    }
}
