//! Core domain layer for steprun.
//!
//! Pure logic with no I/O: answers, the placeholder resolver, condition
//! evaluation and the workflow model. Everything that touches the outside
//! world goes through ports in the application layer.
//!
//! ## Rules
//!
//! - **No I/O**: no filesystem, no processes. Environment lookups and
//!   generators are injected.
//! - **No errors from resolution**: resolving and evaluating degrade to
//!   literal text or a failed clause plus a warning.
//! - **Setup, then freeze**: the placeholder registry is built once and is
//!   read-only while a workflow runs.

pub mod answers;
pub mod condition;
pub mod error;
pub mod placeholder;
pub mod workflow;

mod validation;

pub use answers::{AnswerMap, SELECTION_SEPARATOR};
pub use condition::{AnswerMatch, ConditionClause, ConditionEvaluator};
pub use error::{DomainError, ErrorCategory};
pub use placeholder::{
    EnvLookup, EnvSyntax, GeneratorError, PlaceholderGenerator, PlaceholderRegistry,
    PlaceholderRegistryBuilder, PlaceholderWarning, Resolution, Resolver,
};
pub use validation::DomainValidator;
pub use workflow::{
    Action, ActionKind, CONFIRM_NO, CONFIRM_YES, Diagnostic, PlaceholderSource, Question,
    QuestionKind, Step, Workflow, parse_confirm,
};
