// ============================================================================
// domain/errors.rs - COMPREHENSIVE ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Note that resolution and condition evaluation never produce a
/// `DomainError`: they degrade to literal text or a failed clause. These
/// errors come from building registries and validating workflows.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("Workflow has no steps")]
    EmptyWorkflow,

    #[error("Duplicate question id: {id}")]
    DuplicateQuestion { id: String },

    #[error("Question '{question_id}' of type '{kind}' needs at least one option")]
    MissingOptions { question_id: String, kind: String },

    #[error("Default '{default}' of question '{question_id}' is not one of its options")]
    InvalidDefault { question_id: String, default: String },

    #[error("Required field missing: {field} ({context})")]
    MissingRequiredField { field: &'static str, context: String },

    // ========================================================================
    // Placeholder Registry Errors (409-level equivalent)
    // ========================================================================
    #[error("Placeholder name '{name}' is reserved")]
    ReservedPlaceholder { name: String },

    #[error("Invalid placeholder name '{name}': {reason}")]
    InvalidPlaceholderName { name: String, reason: String },

    #[error("Placeholder '{name}' is already registered")]
    DuplicatePlaceholder { name: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidWorkflow(msg) => vec![
                "Check your workflow file".into(),
                format!("Details: {}", msg),
            ],
            Self::EmptyWorkflow => vec![
                "Add at least one entry to the \"steps\" array".into(),
                "Try: steprun validate <FILE>".into(),
            ],
            Self::DuplicateQuestion { id } => vec![
                format!("Question id '{}' is used more than once", id),
                "Question ids must be unique across the whole workflow".into(),
            ],
            Self::MissingOptions { question_id, .. } => vec![
                format!("Add an \"options\" array to question '{}'", question_id),
                "Or change its type to \"text\"".into(),
            ],
            Self::InvalidDefault { question_id, .. } => vec![
                format!(
                    "The default of question '{}' must match one of its options exactly",
                    question_id
                ),
            ],
            Self::ReservedPlaceholder { name } => vec![
                format!("'{}' is a built-in placeholder", name),
                "Choose another name, e.g. PROJECT_ID".into(),
            ],
            Self::InvalidPlaceholderName { .. } => vec![
                "Placeholder names use UPPER_SNAKE_CASE by convention".into(),
                "Names cannot contain '[', ']' or '\\'".into(),
            ],
            Self::DuplicatePlaceholder { name } => vec![
                format!("Placeholder '{}' is declared twice", name),
                "Remove one declaration or rename it".into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidWorkflow(_)
            | Self::EmptyWorkflow
            | Self::DuplicateQuestion { .. }
            | Self::MissingOptions { .. }
            | Self::InvalidDefault { .. }
            | Self::MissingRequiredField { .. } => ErrorCategory::Validation,
            Self::ReservedPlaceholder { .. }
            | Self::InvalidPlaceholderName { .. }
            | Self::DuplicatePlaceholder { .. } => ErrorCategory::Conflict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    NotFound,
    Internal,
}
