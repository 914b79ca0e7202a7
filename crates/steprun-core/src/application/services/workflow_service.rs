//! Workflow Service - main application orchestrator.
//!
//! Walks the steps of a workflow in order:
//! 1. Gate and ask the step's question, storing the answer
//! 2. Gate, resolve and execute each action
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, info_span, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CommandRunner, Filesystem, Prompter},
        services::action_runner::ActionRunner,
    },
    domain::{
        ActionKind, AnswerMap, CONFIRM_NO, CONFIRM_YES, ConditionEvaluator, DomainValidator,
        EnvLookup, PlaceholderRegistry, Question, QuestionKind, Resolver, SELECTION_SEPARATOR,
        Workflow, parse_confirm,
    },
    error::{SteprunError, SteprunResult},
};

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Relative action paths are joined onto this directory.
    pub base_dir: PathBuf,
    /// Record actions without executing them.
    pub dry_run: bool,
    /// Never prompt; use presets, then defaults.
    pub non_interactive: bool,
    /// Answers supplied up front, by question id.
    pub preset_answers: AnswerMap,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            dry_run: false,
            non_interactive: false,
            preset_answers: AnswerMap::new(),
        }
    }
}

/// What happened to one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Executed,
    /// Conditions did not hold.
    Skipped,
    /// Would have executed.
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    /// Step label (name or `#n`).
    pub step: String,
    /// The action as executed (resolved), or as written when skipped.
    pub action: ActionKind,
    pub outcome: ActionOutcome,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub answers: AnswerMap,
    pub actions: Vec<ActionRecord>,
    pub skipped_questions: Vec<String>,
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn count(&self, outcome: ActionOutcome) -> usize {
        self.actions.iter().filter(|a| a.outcome == outcome).count()
    }
}

/// Main workflow service.
///
/// Owns the ports and the frozen placeholder registry for the lifetime of
/// one or more runs. Each run starts from an empty answer map.
pub struct WorkflowService {
    prompter: Box<dyn Prompter>,
    filesystem: Box<dyn Filesystem>,
    commands: Box<dyn CommandRunner>,
    resolver: Resolver,
}

impl WorkflowService {
    /// Create a new workflow service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use steprun_core::application::WorkflowService;
    /// # use steprun_core::application::{CommandRunner, Filesystem, Prompter};
    /// # use steprun_core::domain::PlaceholderRegistry;
    /// # let prompter: Box<dyn Prompter> = unimplemented!();
    /// # let filesystem: Box<dyn Filesystem> = unimplemented!();
    /// # let commands: Box<dyn CommandRunner> = unimplemented!();
    /// # let registry: PlaceholderRegistry = unimplemented!();
    ///
    /// let service = WorkflowService::new(
    ///     prompter,   // impl Prompter
    ///     filesystem, // impl Filesystem
    ///     commands,   // impl CommandRunner
    ///     registry,   // PlaceholderRegistry
    /// );
    /// ```
    pub fn new(
        prompter: Box<dyn Prompter>,
        filesystem: Box<dyn Filesystem>,
        commands: Box<dyn CommandRunner>,
        registry: PlaceholderRegistry,
    ) -> Self {
        Self {
            prompter,
            filesystem,
            commands,
            resolver: Resolver::new(registry),
        }
    }

    /// Replace the environment used for `$NAME` expansion.
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.resolver = self.resolver.with_env_lookup(env);
        self
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Run a workflow to completion.
    ///
    /// The first failing action aborts the run; earlier actions are not
    /// undone.
    #[instrument(
        skip_all,
        fields(
            workflow = workflow.name.as_deref().unwrap_or("unnamed"),
            base_dir = %options.base_dir.display(),
            dry_run = options.dry_run
        )
    )]
    pub fn run(&self, workflow: &Workflow, options: &RunOptions) -> SteprunResult<RunReport> {
        DomainValidator::validate_workflow(workflow)?;
        info!(steps = workflow.steps.len(), "Running workflow");

        let evaluator = ConditionEvaluator::new(&self.resolver);
        let runner = ActionRunner::new(
            self.filesystem.as_ref(),
            self.commands.as_ref(),
            &self.resolver,
            &options.base_dir,
        );

        let mut answers = AnswerMap::new();
        let mut report = RunReport::default();

        for (index, step) in workflow.steps.iter().enumerate() {
            let label = step.label(index);
            let _span = info_span!("step", step = %label).entered();

            if let Some(question) = &step.question {
                if evaluator.evaluate(&question.conditions, &answers) {
                    let answer = self.answer(question, &answers, options, &mut report)?;
                    debug!(question_id = %question.id, answer = %answer, "Answer stored");
                    answers.insert(question.id.clone(), answer);
                } else {
                    debug!(question_id = %question.id, "Question skipped");
                    report.skipped_questions.push(question.id.clone());
                }
            }

            for action in &step.actions {
                if !evaluator.evaluate(&action.conditions, &answers) {
                    debug!(action = action.kind.name(), "Action skipped");
                    report.actions.push(ActionRecord {
                        step: label.clone(),
                        action: action.kind.clone(),
                        outcome: ActionOutcome::Skipped,
                    });
                    continue;
                }

                let mut warnings = Vec::new();
                let resolved = action
                    .kind
                    .resolve_collecting(&self.resolver, &answers, &mut warnings);
                record_warnings(&mut report, &warnings);

                let outcome = if options.dry_run {
                    info!(action = %resolved, "Dry run");
                    ActionOutcome::DryRun
                } else {
                    info!(action = %resolved, "Executing");
                    runner.execute(&resolved, &answers)?;
                    ActionOutcome::Executed
                };

                report.actions.push(ActionRecord {
                    step: label.clone(),
                    action: resolved,
                    outcome,
                });
            }
        }

        info!(
            executed = report.count(ActionOutcome::Executed),
            skipped = report.count(ActionOutcome::Skipped),
            "Workflow completed"
        );
        report.answers = answers;
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Obtain an answer: preset, then prompt (or default when
    /// non-interactive).
    fn answer(
        &self,
        question: &Question,
        answers: &AnswerMap,
        options: &RunOptions,
        report: &mut RunReport,
    ) -> SteprunResult<String> {
        let mut resolve = |text: &str| {
            let resolution = self.resolver.resolve_with_report(text, answers);
            record_warnings(report, &resolution.warnings);
            resolution.text
        };

        let prompt = resolve(&question.prompt);
        let default = question.default.as_deref().map(&mut resolve);
        let choices: Vec<String> = question.options.iter().map(|o| resolve(o)).collect();

        if let Some(preset) = options.preset_answers.get(&question.id) {
            return normalize(question, preset, &choices);
        }

        if options.non_interactive {
            return match default {
                Some(default) => normalize(question, &default, &choices),
                None => Err(ApplicationError::MissingAnswer {
                    question_id: question.id.clone(),
                }
                .into()),
            };
        }

        match question.kind {
            QuestionKind::Text => loop {
                let answer = self.prompter.input(&prompt, default.as_deref())?;
                if question.required && answer.trim().is_empty() {
                    warn!(question_id = %question.id, "An answer is required");
                    continue;
                }
                return Ok(answer);
            },
            QuestionKind::Confirm => {
                let default = default.as_deref().and_then(parse_confirm);
                let yes = self.prompter.confirm(&prompt, default)?;
                Ok(if yes { CONFIRM_YES } else { CONFIRM_NO }.to_string())
            }
            QuestionKind::Select => {
                let default = default
                    .as_deref()
                    .and_then(|d| choices.iter().position(|c| c == d));
                let index = self.prompter.select(&prompt, &choices, default)?;
                choices.get(index).cloned().ok_or_else(|| {
                    ApplicationError::PromptFailed {
                        question_id: question.id.clone(),
                        reason: format!("selection {index} out of range"),
                    }
                    .into()
                })
            }
            QuestionKind::Multiselect => {
                let preselected: Vec<&str> = default
                    .as_deref()
                    .map(|d| d.split(SELECTION_SEPARATOR).collect())
                    .unwrap_or_default();
                let defaults: Vec<bool> = choices
                    .iter()
                    .map(|c| preselected.contains(&c.as_str()))
                    .collect();

                let picked = self.prompter.multiselect(&prompt, &choices, &defaults)?;
                Ok(AnswerMap::join_selection(
                    picked.iter().filter_map(|&i| choices.get(i)),
                ))
            }
        }
    }
}

fn record_warnings(report: &mut RunReport, warnings: &[crate::domain::PlaceholderWarning]) {
    report
        .warnings
        .extend(warnings.iter().map(ToString::to_string));
}

/// Check a preset or default answer against its question and bring it
/// into stored form.
fn normalize(question: &Question, raw: &str, choices: &[String]) -> SteprunResult<String> {
    let invalid = |reason: &str| -> SteprunError {
        ApplicationError::InvalidAnswer {
            question_id: question.id.clone(),
            answer: raw.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    match question.kind {
        QuestionKind::Text => {
            if question.required && raw.trim().is_empty() {
                Err(invalid("an answer is required"))
            } else {
                Ok(raw.to_string())
            }
        }
        QuestionKind::Confirm => match parse_confirm(raw) {
            Some(true) => Ok(CONFIRM_YES.to_string()),
            Some(false) => Ok(CONFIRM_NO.to_string()),
            None => Err(invalid("expected yes or no")),
        },
        QuestionKind::Select => {
            if choices.iter().any(|c| c == raw) {
                Ok(raw.to_string())
            } else {
                Err(invalid("not one of the options"))
            }
        }
        QuestionKind::Multiselect => {
            let picked: Vec<&str> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();
            if picked.iter().all(|p| choices.iter().any(|c| c == p)) {
                Ok(AnswerMap::join_selection(picked))
            } else {
                Err(invalid("contains a value that is not an option"))
            }
        }
    }
}
