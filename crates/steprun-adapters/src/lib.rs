//! Infrastructure adapters for steprun.
//!
//! This crate implements the ports defined in `steprun-core::application::ports`
//! and the setup-phase pieces that touch the outside world: loading workflow
//! files and registering the built-in dynamic placeholders.

pub mod builtin_placeholders;
pub mod command;
pub mod filesystem;
pub mod prompt;
pub mod workflow_loader;

// Re-export commonly used adapters
pub use builtin_placeholders::{register_builtins, register_workflow_placeholders};
pub use command::{RecordingCommandRunner, ShellCommandRunner};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use prompt::ScriptedPrompter;
pub use workflow_loader::WorkflowLoader;
