//! Dynamic placeholders registered before a run.
//!
//! Two sources feed the registry builder:
//!
//! - the built-ins (`CURRENT_DATE`, `CURRENT_YEAR`, `TIMESTAMP`, `CURRENT_DIR`)
//! - the `placeholders` table of the workflow file
//!
//! Workflow placeholders are registered first, so a workflow may shadow a
//! built-in by declaring the same name.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use steprun_core::{
    application::ports::CommandRunner,
    domain::{
        AnswerMap, DomainError, EnvLookup, GeneratorError, PlaceholderGenerator,
        PlaceholderRegistryBuilder, PlaceholderSource, Workflow,
    },
};
use tracing::{debug, instrument};

pub const CURRENT_DATE: &str = "CURRENT_DATE";
pub const CURRENT_YEAR: &str = "CURRENT_YEAR";
pub const TIMESTAMP: &str = "TIMESTAMP";
pub const CURRENT_DIR: &str = "CURRENT_DIR";

/// Names of the built-in placeholders.
pub const BUILTIN_NAMES: [&str; 4] = [CURRENT_DATE, CURRENT_YEAR, TIMESTAMP, CURRENT_DIR];

/// Register the built-in placeholders, skipping names already taken.
///
/// `CURRENT_DIR` reports `base_dir`, the directory the run operates in.
pub fn register_builtins(
    builder: &mut PlaceholderRegistryBuilder,
    base_dir: &Path,
) -> Result<(), DomainError> {
    register_unless_taken(builder, CURRENT_DATE, |_: &AnswerMap| {
        Ok::<_, GeneratorError>(Utc::now().format("%Y-%m-%d").to_string())
    })?;
    register_unless_taken(builder, CURRENT_YEAR, |_: &AnswerMap| {
        Ok::<_, GeneratorError>(Utc::now().format("%Y").to_string())
    })?;
    register_unless_taken(builder, TIMESTAMP, |_: &AnswerMap| {
        Ok::<_, GeneratorError>(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true))
    })?;

    let dir = base_dir.display().to_string();
    register_unless_taken(builder, CURRENT_DIR, move |_: &AnswerMap| {
        Ok::<_, GeneratorError>(dir.clone())
    })
}

fn register_unless_taken<G>(
    builder: &mut PlaceholderRegistryBuilder,
    name: &str,
    generator: G,
) -> Result<(), DomainError>
where
    G: PlaceholderGenerator + 'static,
{
    if builder.contains(name) {
        debug!(placeholder = name, "Built-in shadowed by workflow");
        return Ok(());
    }
    builder.register(name, generator)
}

/// Register the placeholders a workflow declares.
///
/// Command placeholders run through `commands` in `cwd` each time the
/// placeholder is resolved; a non-zero exit is a generator error.
#[instrument(skip_all, fields(count = workflow.placeholders.len()))]
pub fn register_workflow_placeholders(
    builder: &mut PlaceholderRegistryBuilder,
    workflow: &Workflow,
    commands: Arc<dyn CommandRunner>,
    cwd: &Path,
    env: EnvLookup,
) -> Result<(), DomainError> {
    for (name, source) in &workflow.placeholders {
        match source.clone() {
            PlaceholderSource::Command(command) => {
                let runner = Arc::clone(&commands);
                let cwd: PathBuf = cwd.to_path_buf();
                builder.register(name.clone(), move |_: &AnswerMap| {
                    run_placeholder_command(runner.as_ref(), &command, &cwd)
                })?;
            }
            PlaceholderSource::Env(variable) => {
                let env = env.clone();
                builder.register(name.clone(), move |_: &AnswerMap| {
                    env.get(&variable).ok_or_else(|| {
                        GeneratorError::new(format!("environment variable {variable} is not set"))
                    })
                })?;
            }
            PlaceholderSource::Value(value) => {
                builder.register(name.clone(), move |_: &AnswerMap| {
                    Ok::<_, GeneratorError>(value.clone())
                })?;
            }
        }
        debug!(placeholder = %name, "Registered workflow placeholder");
    }

    Ok(())
}

fn run_placeholder_command(
    runner: &dyn CommandRunner,
    command: &str,
    cwd: &Path,
) -> Result<String, GeneratorError> {
    let output = runner
        .run(command, cwd)
        .map_err(|e| GeneratorError::new(e.to_string()))?;

    if !output.is_success() {
        let detail = output.stderr.trim();
        return Err(GeneratorError::new(match output.code {
            Some(code) if detail.is_empty() => format!("`{command}` exited with {code}"),
            Some(code) => format!("`{command}` exited with {code}: {detail}"),
            None => format!("`{command}` was terminated by a signal"),
        }));
    }

    Ok(output.stdout.trim().to_string())
}
