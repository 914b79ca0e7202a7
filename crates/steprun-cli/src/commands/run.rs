//! `steprun run`: execute a workflow.

use std::path::PathBuf;

use steprun_adapters::{LocalFilesystem, ScriptedPrompter};
use steprun_core::application::{
    ActionOutcome, ActionRecord, RunOptions, RunReport, WorkflowService, ports::Prompter,
};
use tracing::{debug, info, instrument};

use super::{build_registry, load_workflow, shell_runner, workflow_path};
use crate::{
    answers,
    cli::RunArgs,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
    prompt::LinePrompter,
};

#[instrument(skip_all, fields(dry_run = args.dry_run, non_interactive = args.non_interactive))]
pub fn execute(
    args: RunArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = workflow_path(args.file, &config);
    let workflow = load_workflow(&path)?;

    let preset_answers = answers::collect(&args.answers, args.answers_file.as_deref())?;

    let base_dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    if !args.dry_run && !base_dir.exists() {
        std::fs::create_dir_all(&base_dir).with_cli_context(|| {
            format!("Failed to create directory {}", base_dir.display())
        })?;
    }

    let registry = build_registry(Some(&workflow), &base_dir, &config)?;

    // Action output would corrupt a JSON report on stdout.
    let commands = shell_runner(&config, output.is_json());

    let service = WorkflowService::new(
        prompter(args.non_interactive),
        Box::new(LocalFilesystem::new()),
        Box::new(commands),
        registry,
    );

    if !output.is_json() {
        let title = workflow.name.as_deref().unwrap_or("workflow");
        output.header(&format!("Running {title} ({})", path.display()))?;
        if args.dry_run {
            output.info("Dry run: nothing will be changed")?;
        }
    }

    let options = RunOptions {
        base_dir,
        dry_run: args.dry_run,
        non_interactive: args.non_interactive,
        preset_answers,
    };

    let report = service
        .run(&workflow, &options)
        .with_cli_context(|| format!("running {}", path.display()))?;

    info!(
        executed = report.count(ActionOutcome::Executed),
        skipped = report.count(ActionOutcome::Skipped),
        "Workflow finished"
    );

    if output.is_json() {
        output.json(&report)?;
    } else {
        print_report(&report, &output)?;
    }

    Ok(())
}

fn prompter(non_interactive: bool) -> Box<dyn Prompter> {
    if non_interactive {
        // never consulted: the service falls back to presets and defaults
        return Box::new(ScriptedPrompter::default());
    }

    #[cfg(feature = "interactive")]
    {
        use std::io::IsTerminal;
        if std::io::stdin().is_terminal() {
            debug!("Using terminal prompter");
            return Box::new(crate::prompt::TerminalPrompter::new());
        }
    }

    debug!("Reading answers line by line from stdin");
    Box::new(LinePrompter::stdio())
}

fn print_report(report: &RunReport, output: &OutputManager) -> CliResult<()> {
    for record in &report.actions {
        let line = describe(record);
        match record.outcome {
            ActionOutcome::Executed => output.success(&line)?,
            ActionOutcome::DryRun => output.info(&format!("would {line}"))?,
            ActionOutcome::Skipped => output.skipped(&format!("{line} (skipped)"))?,
        }
    }

    for id in &report.skipped_questions {
        output.skipped(&format!("question '{id}' not asked"))?;
    }
    for warning in &report.warnings {
        output.warning(warning)?;
    }

    let executed = report.count(ActionOutcome::Executed);
    let dry = report.count(ActionOutcome::DryRun);
    let skipped = report.count(ActionOutcome::Skipped);

    output.print("")?;
    if dry > 0 {
        output.success(&format!("{dry} action(s) planned, {skipped} skipped"))?;
    } else {
        output.success(&format!("{executed} action(s) executed, {skipped} skipped"))?;
    }
    Ok(())
}

fn describe(record: &ActionRecord) -> String {
    format!("[{}] {}", record.step, record.action)
}
