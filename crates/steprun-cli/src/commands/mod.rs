//! Command handlers, one module per subcommand.

pub mod completions;
pub mod config;
pub mod init;
pub mod resolve;
pub mod run;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use steprun_adapters::{
    ShellCommandRunner, WorkflowLoader, register_builtins, register_workflow_placeholders,
};
use steprun_core::{
    domain::{EnvLookup, PlaceholderRegistry, Workflow},
    error::SteprunError,
};

use crate::{
    config::AppConfig,
    error::{CliResult, IntoCli},
};

/// The workflow file to use: the argument, else the configured default.
fn workflow_path(file: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    file.unwrap_or_else(|| config.workflow.default_file.clone())
}

fn load_workflow(path: &Path) -> CliResult<Workflow> {
    WorkflowLoader::new()
        .load(path)
        .with_cli_context(|| format!("loading workflow {}", path.display()))
}

/// Capturing shell runner honouring `workflow.shell`.
fn shell_runner(config: &AppConfig, capture: bool) -> ShellCommandRunner {
    let runner = if capture {
        ShellCommandRunner::new()
    } else {
        ShellCommandRunner::inheriting()
    };
    match &config.workflow.shell {
        Some(shell) => runner.with_shell(shell.clone()),
        None => runner,
    }
}

/// Workflow placeholders first, so they may shadow the built-ins.
fn build_registry(
    workflow: Option<&Workflow>,
    base_dir: &Path,
    config: &AppConfig,
) -> CliResult<PlaceholderRegistry> {
    let mut builder = PlaceholderRegistry::builder();

    if let Some(workflow) = workflow {
        register_workflow_placeholders(
            &mut builder,
            workflow,
            Arc::new(shell_runner(config, true)),
            base_dir,
            EnvLookup::process(),
        )
        .map_err(SteprunError::from)?;
    }

    if config.placeholders.builtins {
        register_builtins(&mut builder, base_dir)
            .map_err(SteprunError::from)?;
    }

    Ok(builder.build())
}
