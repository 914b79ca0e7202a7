//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "run a workflow".

pub mod action_runner;
pub mod workflow_service;

pub use action_runner::ActionRunner;
pub use workflow_service::{ActionOutcome, ActionRecord, RunOptions, RunReport, WorkflowService};
