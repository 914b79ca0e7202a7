//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "steprun",
    bin_name = "steprun",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Run interactive, JSON-defined workflows",
    long_about = "steprun walks a JSON workflow step by step: it asks questions, \
                  substitutes [[[...]]] placeholders, and copies, edits, renames \
                  or runs whatever each step describes.",
    after_help = "EXAMPLES:\n\
        \x20 steprun run\n\
        \x20 steprun run setup.json --answer name=shop --dir ../shop\n\
        \x20 steprun validate setup.json\n\
        \x20 steprun resolve 'Hello [[[ANS:who]]]' --answer who=world\n\
        \x20 steprun completions bash > /usr/share/bash-completion/completions/steprun",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a workflow.
    #[command(
        visible_alias = "r",
        about = "Run a workflow",
        after_help = "EXAMPLES:\n\
            \x20 steprun run                                  # ./steprun.json\n\
            \x20 steprun run web.json --dry-run\n\
            \x20 steprun run web.json --non-interactive --answers answers.json\n\
            \x20 steprun run web.json -a name=shop -a fw=React"
    )]
    Run(RunArgs),

    /// Check a workflow without running it.
    #[command(
        about = "Validate a workflow file",
        after_help = "EXAMPLES:\n\
            \x20 steprun validate\n\
            \x20 steprun validate web.json --output-format json"
    )]
    Validate(ValidateArgs),

    /// Resolve placeholders in a piece of text.
    #[command(
        about = "Resolve placeholders in TEXT",
        after_help = "EXAMPLES:\n\
            \x20 steprun resolve '[[[CURRENT_YEAR]]]'\n\
            \x20 steprun resolve 'id: [[[UUIDv4]]]'\n\
            \x20 steprun resolve 'by [[[AUTHOR]]]' --workflow web.json"
    )]
    Resolve(ResolveArgs),

    /// Create a starter workflow or configuration file.
    #[command(
        about = "Create a starter workflow",
        after_help = "EXAMPLES:\n\
            \x20 steprun init             # ./steprun.json\n\
            \x20 steprun init --force     # overwrite it\n\
            \x20 steprun init --global    # default config file"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 steprun completions bash > ~/.local/share/bash-completion/completions/steprun\n\
            \x20 steprun completions zsh  > ~/.zfunc/_steprun\n\
            \x20 steprun completions fish > ~/.config/fish/completions/steprun.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 steprun config get workflow.default_file\n\
            \x20 steprun config list\n\
            \x20 steprun config path"
    )]
    Config(ConfigCommands),
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Arguments for `steprun run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Workflow file; defaults to `workflow.default_file` from the config.
    #[arg(value_name = "FILE", help = "Workflow file (default: steprun.json)")]
    pub file: Option<PathBuf>,

    /// Answer a question up front.  Repeatable.
    #[arg(
        short = 'a',
        long = "answer",
        value_name = "ID=VALUE",
        help = "Preset an answer (repeatable)"
    )]
    pub answers: Vec<String>,

    /// JSON object of preset answers; `--answer` wins on conflicts.
    #[arg(long = "answers", value_name = "FILE", help = "Read preset answers from a JSON file")]
    pub answers_file: Option<PathBuf>,

    /// Directory that relative action paths are resolved against.
    #[arg(
        short = 'd',
        long = "dir",
        value_name = "DIR",
        help = "Working directory for actions (default: current directory)"
    )]
    pub dir: Option<PathBuf>,

    /// Preview what would run without touching the disk.
    #[arg(long = "dry-run", help = "Show actions without executing them")]
    pub dry_run: bool,

    /// Never prompt: use preset answers, then question defaults.
    #[arg(
        short = 'y',
        long = "non-interactive",
        help = "Do not prompt; fail if a question has no answer"
    )]
    pub non_interactive: bool,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `steprun validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(value_name = "FILE", help = "Workflow file (default: steprun.json)")]
    pub file: Option<PathBuf>,
}

// ── resolve ───────────────────────────────────────────────────────────────────

/// Arguments for `steprun resolve`.
#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Text containing placeholders.
    #[arg(value_name = "TEXT", help = "Text to resolve")]
    pub text: String,

    #[arg(
        short = 'a',
        long = "answer",
        value_name = "ID=VALUE",
        help = "Answer available as [[[ANS:ID]]] (repeatable)"
    )]
    pub answers: Vec<String>,

    /// Register the placeholders this workflow declares.
    #[arg(
        short = 'w',
        long = "workflow",
        value_name = "FILE",
        help = "Also use the placeholders declared by FILE"
    )]
    pub workflow: Option<PathBuf>,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `steprun init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write the default configuration file instead of a workflow.
    #[arg(long = "global", help = "Create the global configuration file")]
    pub global: bool,

    /// Overwrite an existing file.
    #[arg(short = 'f', long = "force", help = "Overwrite an existing file")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `steprun completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `steprun config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `workflow.default_file`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_run_with_presets() {
        let cli = Cli::parse_from([
            "steprun",
            "run",
            "web.json",
            "-a",
            "name=shop",
            "--answer",
            "fw=React",
            "--dir",
            "out",
            "--dry-run",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected Run command");
        };
        assert_eq!(args.file, Some(PathBuf::from("web.json")));
        assert_eq!(args.answers, vec!["name=shop", "fw=React"]);
        assert_eq!(args.dir, Some(PathBuf::from("out")));
        assert!(args.dry_run);
        assert!(!args.non_interactive);
    }

    #[test]
    fn run_file_is_optional() {
        let cli = Cli::parse_from(["steprun", "run", "-y"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected Run command");
        };
        assert!(args.file.is_none());
        assert!(args.non_interactive);
    }

    #[test]
    fn run_alias() {
        let cli = Cli::parse_from(["steprun", "r"]);
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["steprun", "validate", "-vv", "--log-file", "out.log"]);
        assert_eq!(cli.global.verbose, 2);
        assert_eq!(cli.global.log_file, Some(PathBuf::from("out.log")));
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["steprun", "--quiet", "--verbose", "validate"]);
        assert!(result.is_err());
    }

    #[test]
    fn resolve_requires_text() {
        assert!(Cli::try_parse_from(["steprun", "resolve"]).is_err());
    }
}
