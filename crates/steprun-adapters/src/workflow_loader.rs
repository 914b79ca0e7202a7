//! JSON workflow loader.
//!
//! # File format
//!
//! ```json
//! {
//!   "name": "web-app",
//!   "placeholders": { "AUTHOR": { "command": "git config user.name" } },
//!   "steps": [
//!     {
//!       "question": { "id": "name", "type": "text", "prompt": "Project name?" },
//!       "actions": [
//!         { "type": "copy", "src": "template", "dest": "[[[ANS:name]]]" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Loading parses, then validates with [`DomainValidator`]. Soft problems
//! (see [`Workflow::diagnostics`]) are logged but do not stop a load.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use steprun_core::{
    application::ApplicationError,
    domain::{DomainValidator, Workflow},
    error::SteprunResult,
};
use tracing::{debug, instrument, warn};

/// Loads workflow definitions from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn new() -> Self {
        Self
    }

    /// Read, parse and validate the workflow at `path`.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> SteprunResult<Workflow> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ApplicationError::WorkflowNotFound {
                path: path.to_path_buf(),
            },
            _ => ApplicationError::WorkflowLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        self.parse(&text, path)
    }

    /// Parse and validate workflow JSON. `origin` only labels errors.
    pub fn parse(&self, text: &str, origin: impl Into<PathBuf>) -> SteprunResult<Workflow> {
        let origin = origin.into();
        let workflow: Workflow =
            serde_json::from_str(text).map_err(|e| ApplicationError::WorkflowLoad {
                path: origin.clone(),
                reason: format!("line {}, column {}: {}", e.line(), e.column(), e),
            })?;

        DomainValidator::validate_workflow(&workflow)?;

        for diagnostic in workflow.diagnostics() {
            warn!(workflow = %origin.display(), "{diagnostic}");
        }

        debug!(
            steps = workflow.steps.len(),
            placeholders = workflow.placeholders.len(),
            "Workflow loaded"
        );
        Ok(workflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steprun_core::{
        domain::{ActionKind, DomainError, QuestionKind},
        error::SteprunError,
    };
    use tempfile::TempDir;

    const MINIMAL: &str = r#"{
        "name": "demo",
        "steps": [
            {
                "question": { "id": "lang", "type": "select", "text": "Language?",
                              "options": ["Rust", "Go"], "default": "Rust" },
                "actions": [
                    { "type": "mkdir", "path": "src",
                      "conditions": [ { "question_id": "lang", "ans": "Rust" } ] }
                ]
            }
        ]
    }"#;

    #[test]
    fn loads_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("steprun.json");
        fs::write(&path, MINIMAL).unwrap();

        let wf = WorkflowLoader::new().load(&path).unwrap();

        assert_eq!(wf.name.as_deref(), Some("demo"));
        let question = wf.steps[0].question.as_ref().unwrap();
        assert_eq!(question.kind, QuestionKind::Select);
        assert_eq!(question.prompt, "Language?");
        assert!(matches!(
            wf.steps[0].actions[0].kind,
            ActionKind::Mkdir { ref path } if path == "src"
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = WorkflowLoader::new()
            .load(&temp.path().join("absent.json"))
            .unwrap_err();

        assert!(matches!(
            err,
            SteprunError::Application(ApplicationError::WorkflowNotFound { .. })
        ));
    }

    #[test]
    fn syntax_errors_carry_position() {
        let err = WorkflowLoader::new()
            .parse("{\n  \"steps\": [\n    oops\n  ]\n}", "broken.json")
            .unwrap_err();

        match err {
            SteprunError::Application(ApplicationError::WorkflowLoad { path, reason }) => {
                assert_eq!(path, PathBuf::from("broken.json"));
                assert!(reason.starts_with("line 3,"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_workflows_are_rejected() {
        let err = WorkflowLoader::new()
            .parse(r#"{ "steps": [] }"#, "empty.json")
            .unwrap_err();
        assert!(matches!(err, SteprunError::Domain(DomainError::EmptyWorkflow)));

        let err = WorkflowLoader::new()
            .parse(
                r#"{ "steps": [ { "question": { "id": "x", "type": "select", "text": "?" } } ] }"#,
                "no-options.json",
            )
            .unwrap_err();
        assert!(matches!(
            err,
            SteprunError::Domain(DomainError::MissingOptions { .. })
        ));
    }
}
