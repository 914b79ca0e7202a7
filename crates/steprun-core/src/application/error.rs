//! Application layer errors.
//!
//! These errors represent failures while running a workflow, not problems
//! with the workflow itself. Those are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during workflow execution.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// The workflow file could not be read or parsed.
    #[error("Failed to load workflow {path}: {reason}")]
    WorkflowLoad { path: PathBuf, reason: String },

    /// The workflow file does not exist.
    #[error("Workflow file not found: {path}")]
    WorkflowNotFound { path: PathBuf },

    /// Reading an answer from the user failed.
    #[error("Prompt for '{question_id}' failed: {reason}")]
    PromptFailed { question_id: String, reason: String },

    /// The user aborted a prompt.
    #[error("Cancelled by user")]
    Cancelled,

    /// No answer could be obtained in non-interactive mode.
    #[error("No answer for question '{question_id}' in non-interactive mode")]
    MissingAnswer { question_id: String },

    /// A preset answer is not valid for its question.
    #[error("Invalid answer '{answer}' for question '{question_id}': {reason}")]
    InvalidAnswer {
        question_id: String,
        answer: String,
        reason: String,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// A copy would overwrite an existing path.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// The `find` pattern of a regex replace action does not compile.
    #[error("Invalid replace pattern '{pattern}': {reason}")]
    InvalidReplacePattern { pattern: String, reason: String },

    /// A command action (or command placeholder) could not be spawned.
    #[error("Failed to run `{command}`: {reason}")]
    CommandSpawn { command: String, reason: String },

    /// A command action exited unsuccessfully.
    #[error("Command `{command}` failed with exit code {code:?}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Shared state of an adapter was poisoned.
    #[error("Internal lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::WorkflowLoad { path, reason } => vec![
                format!("Could not load {}", path.display()),
                format!("Details: {}", reason),
                "Check the file is valid JSON".into(),
            ],
            Self::WorkflowNotFound { path } => vec![
                format!("No workflow at {}", path.display()),
                "Try: steprun init to create a starter workflow".into(),
            ],
            Self::MissingAnswer { question_id } => vec![
                format!("Pass one with: --answer {}=<VALUE>", question_id),
                "Or give the question a \"default\"".into(),
                "Or run without --non-interactive".into(),
            ],
            Self::InvalidAnswer { question_id, .. } => vec![format!(
                "Check the options of question '{}'",
                question_id
            )],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::DestinationExists { path } => vec![
                format!("Path already exists: {}", path.display()),
                "Set \"overwrite\": true on the copy action to replace it".into(),
            ],
            Self::InvalidReplacePattern { .. } => vec![
                "Check the regex syntax of the \"find\" property".into(),
                "Or set \"regex\": false for a literal replacement".into(),
            ],
            Self::CommandFailed { stderr, .. } if !stderr.trim().is_empty() => {
                vec![format!("Command output: {}", stderr.trim())]
            }
            Self::CommandSpawn { .. } | Self::CommandFailed { .. } => vec![
                "Check the command exists and runs in your shell".into(),
                "Use --dry-run to see the resolved command".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::WorkflowNotFound { .. } => ErrorCategory::NotFound,
            Self::WorkflowLoad { .. }
            | Self::MissingAnswer { .. }
            | Self::InvalidAnswer { .. }
            | Self::InvalidReplacePattern { .. } => ErrorCategory::Validation,
            Self::DestinationExists { .. } => ErrorCategory::Conflict,
            Self::CommandSpawn { .. }
            | Self::CommandFailed { .. }
            | Self::FilesystemError { .. } => ErrorCategory::Execution,
            Self::PromptFailed { .. } | Self::Cancelled | Self::LockPoisoned(_) => {
                ErrorCategory::Internal
            }
        }
    }
}
