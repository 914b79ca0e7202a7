//! Workflow model: steps, questions and actions as parsed from JSON.
//!
//! ```text
//! Workflow
//! ├── placeholders   NAME → command | env | value
//! └── steps[]
//!      ├── question?   asked once, answer stored under its id
//!      └── actions[]   copy | replace | rename | symlink | mkdir | command
//! ```
//!
//! Every string in a question or an action may carry placeholders; they are
//! resolved right before use, never at load time.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::domain::{
    answers::AnswerMap,
    condition::{AnswerMatch, ConditionClause},
    placeholder::{PlaceholderWarning, Resolver, contains_placeholder},
};

/// Stored answer of an accepted confirm question.
pub const CONFIRM_YES: &str = "Yes";
/// Stored answer of a declined confirm question.
pub const CONFIRM_NO: &str = "No";

/// Reads a confirm answer or default: `yes`/`y`/`true` or `no`/`n`/`false`,
/// any case.
pub fn parse_confirm(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Some(true),
        "no" | "n" | "false" => Some(false),
        _ => None,
    }
}

/// A parsed workflow file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Dynamic placeholders declared by the workflow itself.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub placeholders: IndexMap<String, PlaceholderSource>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Where a workflow-declared placeholder takes its value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderSource {
    /// Trimmed stdout of a shell command.
    Command(String),
    /// An environment variable; unset is an error.
    Env(String),
    /// A constant.
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,

    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    #[serde(alias = "text")]
    pub prompt: String,

    #[serde(rename = "type", default)]
    pub kind: QuestionKind,

    /// For confirm questions a JSON boolean is accepted as well.
    #[serde(
        default,
        deserialize_with = "string_or_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionClause>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    Text,
    Confirm,
    Select,
    Multiselect,
}

impl QuestionKind {
    pub fn needs_options(self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Confirm => "confirm",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action of a step, with its gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionClause>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What an action does. Paths are relative to the run's base directory
/// unless absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionKind {
    Copy {
        src: String,
        dest: String,
        #[serde(default)]
        overwrite: bool,
    },
    Replace {
        file: String,
        find: String,
        replace: String,
        #[serde(default)]
        regex: bool,
    },
    Rename {
        from: String,
        to: String,
    },
    Symlink {
        target: String,
        link: String,
    },
    Mkdir {
        path: String,
    },
    Command {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cwd: Option<String>,
    },
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Copy { .. } => "copy",
            Self::Replace { .. } => "replace",
            Self::Rename { .. } => "rename",
            Self::Symlink { .. } => "symlink",
            Self::Mkdir { .. } => "mkdir",
            Self::Command { .. } => "command",
        }
    }

    /// Copy of the action with every string property resolved once,
    /// appending warnings to `warnings`.
    pub fn resolve_collecting(
        &self,
        resolver: &Resolver,
        answers: &AnswerMap,
        warnings: &mut Vec<PlaceholderWarning>,
    ) -> Self {
        let mut r = |s: &str| {
            let resolution = resolver.resolve_with_report(s, answers);
            warnings.extend(resolution.warnings);
            resolution.text
        };
        match self {
            Self::Copy {
                src,
                dest,
                overwrite,
            } => Self::Copy {
                src: r(src),
                dest: r(dest),
                overwrite: *overwrite,
            },
            Self::Replace {
                file,
                find,
                replace,
                regex,
            } => Self::Replace {
                file: r(file),
                find: r(find),
                replace: r(replace),
                regex: *regex,
            },
            Self::Rename { from, to } => Self::Rename {
                from: r(from),
                to: r(to),
            },
            Self::Symlink { target, link } => Self::Symlink {
                target: r(target),
                link: r(link),
            },
            Self::Mkdir { path } => Self::Mkdir { path: r(path) },
            Self::Command { command, cwd } => Self::Command {
                command: r(command),
                cwd: cwd.as_deref().map(&mut r),
            },
        }
    }

    /// Required string properties, by field name.
    pub(crate) fn required_fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Copy { src, dest, .. } => vec![("src", src.as_str()), ("dest", dest.as_str())],
            Self::Replace { file, find, .. } => {
                vec![("file", file.as_str()), ("find", find.as_str())]
            }
            Self::Rename { from, to } => vec![("from", from.as_str()), ("to", to.as_str())],
            Self::Symlink { target, link } => {
                vec![("target", target.as_str()), ("link", link.as_str())]
            }
            Self::Mkdir { path } => vec![("path", path.as_str())],
            Self::Command { command, .. } => vec![("command", command.as_str())],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { src, dest, .. } => write!(f, "copy {src} -> {dest}"),
            Self::Replace { file, find, .. } => write!(f, "replace '{find}' in {file}"),
            Self::Rename { from, to } => write!(f, "rename {from} -> {to}"),
            Self::Symlink { target, link } => write!(f, "symlink {link} -> {target}"),
            Self::Mkdir { path } => write!(f, "mkdir {path}"),
            Self::Command { command, .. } => write!(f, "run `{command}`"),
        }
    }
}

// ── constructors ──────────────────────────────────────────────────────────

impl Workflow {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Questions in the order they would be asked.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.steps.iter().filter_map(|s| s.question.as_ref())
    }

    pub fn action_count(&self) -> usize {
        self.steps.iter().map(|s| s.actions.len()).sum()
    }
}

impl Step {
    pub fn ask(question: Question) -> Self {
        Self {
            question: Some(question),
            ..Self::default()
        }
    }

    pub fn act(actions: Vec<Action>) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Display label: the name if present, else `#<1-based index>`.
    pub fn label(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", index + 1))
    }
}

impl Question {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            kind,
            default: None,
            options: Vec::new(),
            required: false,
            conditions: Vec::new(),
        }
    }

    pub fn text(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(id, prompt, QuestionKind::Text)
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_conditions(mut self, conditions: Vec<ConditionClause>) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl Action {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            conditions: Vec::new(),
            description: None,
        }
    }

    pub fn when(mut self, conditions: Vec<ConditionClause>) -> Self {
        self.conditions = conditions;
        self
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Self::new(kind)
    }
}

fn string_or_bool<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Flag(true) => CONFIRM_YES.to_string(),
        Raw::Flag(false) => CONFIRM_NO.to_string(),
    }))
}

// ── diagnostics ───────────────────────────────────────────────────────────

/// Non-fatal finding about a workflow. A workflow with diagnostics still
/// runs; the affected clauses simply never match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("step {step}: condition references unknown question '{question_id}'")]
    UnknownQuestion { step: String, question_id: String },

    #[error("step {step}: condition references question '{question_id}' which is asked later")]
    ForwardReference { step: String, question_id: String },

    #[error("step {step}: malformed condition clause")]
    MalformedCondition { step: String },

    #[error("step {step}: regex '{pattern}' does not compile: {reason}")]
    InvalidRegex {
        step: String,
        pattern: String,
        reason: String,
    },
}

impl Workflow {
    /// Static checks on every condition clause.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let position: HashMap<&str, usize> = self
            .steps
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.question.as_ref().map(|q| (q.id.as_str(), i)))
            .collect();

        let mut found = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            let label = step.label(index);

            // a question's own gate runs before it is asked
            let question_gate = step
                .question
                .iter()
                .flat_map(|q| q.conditions.iter().map(|c| (c, false)));
            // actions run after the step's question
            let action_gates = step
                .actions
                .iter()
                .flat_map(|a| a.conditions.iter().map(|c| (c, true)));

            for (clause, same_step_ok) in question_gate.chain(action_gates) {
                check_clause(clause, index, same_step_ok, &label, &position, &mut found);
            }
        }

        found
    }
}

fn check_clause(
    clause: &ConditionClause,
    step_index: usize,
    same_step_ok: bool,
    label: &str,
    position: &HashMap<&str, usize>,
    found: &mut Vec<Diagnostic>,
) {
    if !clause.is_well_formed() {
        found.push(Diagnostic::MalformedCondition { step: label.into() });
        return;
    }

    let Some(question_id) = clause.question_id.as_deref() else {
        return;
    };

    match position.get(question_id) {
        None => found.push(Diagnostic::UnknownQuestion {
            step: label.into(),
            question_id: question_id.into(),
        }),
        Some(&asked_at) if asked_at > step_index || (asked_at == step_index && !same_step_ok) => {
            found.push(Diagnostic::ForwardReference {
                step: label.into(),
                question_id: question_id.into(),
            });
        }
        Some(_) => {}
    }

    if let AnswerMatch::Regex { regex } = &clause.ans {
        if !contains_placeholder(regex) {
            if let Err(e) = Regex::new(regex) {
                found.push(Diagnostic::InvalidRegex {
                    step: label.into(),
                    pattern: regex.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
}
