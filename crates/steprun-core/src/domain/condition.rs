//! Condition clauses that gate questions and actions.
//!
//! A list of clauses is combined with AND; the array form of a single
//! clause is an OR over exact values. The `ans` shape is decided once, at
//! parse time, into [`AnswerMatch`].

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{trace, warn};

use crate::domain::{answers::AnswerMap, placeholder::Resolver};

/// Expected answer of a clause.
///
/// JSON mapping:
///
/// | JSON                  | Variant       |
/// |-----------------------|---------------|
/// | `"Yes"`               | `Exact`       |
/// | `{"regex": "^Type"}`  | `Regex`       |
/// | `["React", "Vue"]`    | `AnyOf`       |
/// | anything else         | `Unsupported` |
///
/// `Unsupported` keeps a mistyped clause parseable; it never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerMatch {
    Exact(String),
    Regex { regex: String },
    AnyOf(Vec<String>),
    Unsupported(serde_json::Value),
}

impl Default for AnswerMatch {
    fn default() -> Self {
        Self::Unsupported(serde_json::Value::Null)
    }
}

fn lenient_question_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Some(id),
        _ => None,
    })
}

/// One `{question_id, ans}` gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionClause {
    /// Anything but a string reads as absent, so the clause fails closed.
    #[serde(
        default,
        deserialize_with = "lenient_question_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub question_id: Option<String>,
    #[serde(default)]
    pub ans: AnswerMatch,
}

impl ConditionClause {
    pub fn exact(question_id: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            question_id: Some(question_id.into()),
            ans: AnswerMatch::Exact(expected.into()),
        }
    }

    pub fn regex(question_id: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            question_id: Some(question_id.into()),
            ans: AnswerMatch::Regex {
                regex: pattern.into(),
            },
        }
    }

    pub fn any_of<I, S>(question_id: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question_id: Some(question_id.into()),
            ans: AnswerMatch::AnyOf(options.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether the clause is well-formed enough to ever match.
    pub fn is_well_formed(&self) -> bool {
        self.question_id.is_some() && !matches!(self.ans, AnswerMatch::Unsupported(_))
    }
}

/// Decides whether a gated question or action should run.
///
/// Stateless apart from the borrowed resolver, which expands placeholders
/// inside expected values before they are compared.
#[derive(Debug, Clone, Copy)]
pub struct ConditionEvaluator<'a> {
    resolver: &'a Resolver,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(resolver: &'a Resolver) -> Self {
        Self { resolver }
    }

    /// AND over all clauses; an empty list always passes.
    pub fn evaluate(&self, clauses: &[ConditionClause], answers: &AnswerMap) -> bool {
        for clause in clauses {
            if !self.evaluate_clause(clause, answers) {
                return false;
            }
        }

        true
    }

    /// Evaluate a single clause. Never fails: problems make it not match.
    pub fn evaluate_clause(&self, clause: &ConditionClause, answers: &AnswerMap) -> bool {
        let Some(question_id) = clause.question_id.as_deref() else {
            warn!(clause = ?clause, "Condition without question_id never matches");
            return false;
        };

        // unanswered questions compare as empty
        let actual = answers.get_or_empty(question_id);

        let matched = match &clause.ans {
            AnswerMatch::Exact(expected) => self.resolver.resolve(expected, answers) == actual,
            AnswerMatch::AnyOf(options) => options
                .iter()
                .any(|option| self.resolver.resolve(option, answers) == actual),
            AnswerMatch::Regex { regex } => {
                let pattern = self.resolver.resolve(regex, answers);
                match Regex::new(&pattern) {
                    Ok(re) => re.is_match(actual),
                    Err(e) => {
                        warn!(question_id, pattern = %pattern, error = %e, "Invalid condition regex");
                        false
                    }
                }
            }
            AnswerMatch::Unsupported(value) => {
                warn!(question_id, ans = %value, "Unsupported condition shape never matches");
                false
            }
        };

        trace!(question_id, actual, matched, "Condition evaluated");
        matched
    }
}
