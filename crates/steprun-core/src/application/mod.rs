//! Application layer for steprun.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (WorkflowService, ActionRunner)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. Resolution and condition rules live in
//! `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    ActionOutcome, ActionRecord, ActionRunner, RunOptions, RunReport, WorkflowService,
};

// Re-export port traits (for adapter implementation)
pub use ports::{CommandOutput, CommandRunner, Filesystem, Prompter};

pub use error::ApplicationError;
