//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `steprun-adapters` and the CLI
//! implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: file operations used by actions
//!   - `CommandRunner`: shell commands (actions and command placeholders)
//!   - `Prompter`: asking the user a question
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (`WorkflowService::run`, called by the CLI)

pub mod output;

pub use output::{CommandOutput, CommandRunner, Filesystem, Prompter};

#[cfg(test)]
pub use output::{MockCommandRunner, MockFilesystem};
