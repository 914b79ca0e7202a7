//! `steprun validate`: check a workflow without running it.

use serde::Serialize;
use tracing::instrument;

use super::{load_workflow, workflow_path};
use crate::{
    cli::ValidateArgs,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct ValidationSummary {
    file: String,
    valid: bool,
    steps: usize,
    questions: usize,
    actions: usize,
    diagnostics: Vec<String>,
}

/// Structural errors fail the command; diagnostics are reported as warnings.
#[instrument(skip_all)]
pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let path = workflow_path(args.file, &config);
    let workflow = load_workflow(&path)?;

    let summary = ValidationSummary {
        file: path.display().to_string(),
        valid: true,
        steps: workflow.steps.len(),
        questions: workflow.questions().count(),
        actions: workflow.action_count(),
        diagnostics: workflow
            .diagnostics()
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    if output.is_json() {
        output.json(&summary)?;
        return Ok(());
    }

    for diagnostic in &summary.diagnostics {
        output.warning(diagnostic)?;
    }
    output.success(&format!(
        "{} is valid: {} step(s), {} question(s), {} action(s)",
        summary.file, summary.steps, summary.questions, summary.actions
    ))?;
    Ok(())
}
