//! `steprun resolve`: expand placeholders in a piece of text.
//!
//! Handy for checking what a template string turns into before putting it
//! in a workflow.

use std::path::PathBuf;

use serde::Serialize;
use steprun_core::domain::Resolver;
use tracing::instrument;

use super::{build_registry, load_workflow};
use crate::{
    answers,
    cli::ResolveArgs,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct ResolveOutput {
    text: String,
    warnings: Vec<String>,
}

#[instrument(skip_all)]
pub fn execute(args: ResolveArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let workflow = args.workflow.as_deref().map(load_workflow).transpose()?;
    let answers = answers::collect(&args.answers, None)?;

    let registry = build_registry(workflow.as_ref(), &PathBuf::from("."), &config)?;
    let resolution = Resolver::new(registry).resolve_with_report(&args.text, &answers);

    let result = ResolveOutput {
        text: resolution.text,
        warnings: resolution.warnings.iter().map(ToString::to_string).collect(),
    };

    if output.is_json() {
        output.json(&result)?;
        return Ok(());
    }

    output.result(&result.text)?;
    for warning in &result.warnings {
        output.warning(warning)?;
    }
    Ok(())
}
