//! Options accepted by every `steprun` subcommand.
//!
//! Flattened into [`super::Cli`] with `global = true`, so they may appear
//! before or after the subcommand name.

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log level, counted: `-v` info, `-vv` debug, `-vvv` trace.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Log more of the run (-v, -vv, -vvv)",
        long_help = "Log more of the run on stderr:
    (none)  - warnings and errors only
    -v      - steps started, actions executed
    -vv     - answers recorded, actions skipped by conditions
    -vvv    - every condition clause evaluated

RUST_LOG overrides this when set."
    )]
    pub verbose: u8,

    /// Only errors reach the terminal; prompts are still shown.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print errors only (prompts still appear)"
    )]
    pub quiet: bool,

    /// Plain output even on a terminal. `NO_COLOR` has the same effect.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Turn off colours in progress and report lines"
    )]
    pub no_color: bool,

    /// Settings file read instead of the per-user `steprun/config.toml`.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Read settings from FILE (it must exist)"
    )]
    pub config: Option<PathBuf>,

    /// Shape of the run report and command results on stdout.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Report format on stdout"
    )]
    pub output_format: OutputFormat,

    /// Copy of the log, without colours, for auditing a run afterwards.
    #[arg(
        long = "log-file",
        global = true,
        value_name = "FILE",
        help = "Append the run log to FILE"
    )]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` when piped, unless the config says `json`.
    #[default]
    Auto,
    /// Coloured step and action lines.
    Human,
    /// The same lines without escape codes.
    Plain,
    /// A single JSON document (answers, actions, warnings).
    Json,
}
