//! Command runner adapters.

mod recording;
mod shell;

pub use recording::{RecordedCommand, RecordingCommandRunner};
pub use shell::{ShellCommandRunner, StdioMode};
