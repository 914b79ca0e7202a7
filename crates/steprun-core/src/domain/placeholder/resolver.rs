use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use super::{
    ESCAPED_OPEN, EnvLookup, EnvSyntax, GeneratorError, PlaceholderGenerator,
    PlaceholderRegistry, TOKEN_OPEN, UUID_NAME, answer_token, token,
};
use crate::domain::answers::AnswerMap;

static LEFTOVER_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\[([^\[\]]+)\]\]\]").expect("static token pattern is valid")
});

/// A non-fatal problem met while resolving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderWarning {
    /// A registered generator returned an error or panicked.
    #[error("placeholder '{name}' could not be generated: {reason}")]
    GeneratorFailed { name: String, reason: String },

    /// A token survived every stage (unknown name, unanswered question).
    #[error("unresolved placeholder {token}")]
    Unresolved { token: String },
}

/// Output of [`Resolver::resolve_with_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub warnings: Vec<PlaceholderWarning>,
}

/// Placeholder substitution engine.
///
/// ## Stages
///
/// 1. `[[[ANS:<id>]]]` → stored answer (literal replacement, answer order)
/// 2. `[[[<NAME>]]]`   → registered generator, called once per name per call
/// 3. `[[[UUIDv4]]]`   → a new UUID for every occurrence
/// 4. environment references (`$NAME`, `${NAME}` or `%NAME%`)
/// 5. `\[[[` → `[[[`
///
/// Stages 1–3 only match tokens not preceded by a backslash. The escape is
/// unwrapped last, on the composed text, so an escaped token stays literal
/// whether it was written in the input or arrived inside an answer or a
/// generated value. One backslash is consumed per escape; `\\[[[` therefore
/// yields `\[[[`.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: PlaceholderRegistry,
    env_syntax: EnvSyntax,
    env: EnvLookup,
}

impl Resolver {
    pub fn new(registry: PlaceholderRegistry) -> Self {
        Self {
            registry,
            env_syntax: EnvSyntax::native(),
            env: EnvLookup::process(),
        }
    }

    /// Replace the environment source (tests, sandboxes).
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Override the environment reference syntax.
    pub fn with_env_syntax(mut self, syntax: EnvSyntax) -> Self {
        self.env_syntax = syntax;
        self
    }

    /// Resolve `text`, logging every warning.
    pub fn resolve(&self, text: &str, answers: &AnswerMap) -> String {
        let resolution = self.resolve_with_report(text, answers);
        for warning in &resolution.warnings {
            warn!("{warning}");
        }
        resolution.text
    }

    /// Resolve `text` and hand the warnings back to the caller.
    pub fn resolve_with_report(&self, text: &str, answers: &AnswerMap) -> Resolution {
        let mut warnings = Vec::new();

        let mut text = substitute_answers(text, answers);
        let failed = self.substitute_generated(&mut text, answers, &mut warnings);
        text = substitute_uuids(&text);
        text = super::env::expand(&text, self.env_syntax, &self.env);

        for caps in LEFTOVER_TOKEN.captures_iter(&text) {
            let start = caps.get(0).map_or(0, |m| m.start());
            if is_escaped(&text, start) || failed.contains(&caps[1]) {
                continue;
            }
            warnings.push(PlaceholderWarning::Unresolved {
                token: caps[0].to_string(),
            });
        }

        Resolution {
            text: text.replace(ESCAPED_OPEN, TOKEN_OPEN),
            warnings,
        }
    }

    /// Runs each referenced generator once; returns the names that failed.
    fn substitute_generated(
        &self,
        text: &mut String,
        answers: &AnswerMap,
        warnings: &mut Vec<PlaceholderWarning>,
    ) -> HashSet<String> {
        let mut failed = HashSet::new();

        for (name, generator) in self.registry.iter() {
            let token = token(name);
            let occurrences = unescaped_positions(text, &token).len();
            if occurrences == 0 {
                continue;
            }

            match invoke(generator, answers) {
                Ok(value) => *text = replace_unescaped(text, &token, || value.clone()),
                Err(e) => {
                    // one warning per occurrence left in place
                    for _ in 0..occurrences {
                        warnings.push(PlaceholderWarning::GeneratorFailed {
                            name: name.to_string(),
                            reason: e.reason().to_string(),
                        });
                    }
                    failed.insert(name.to_string());
                }
            }
        }

        failed
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(PlaceholderRegistry::empty())
    }
}

fn substitute_answers(text: &str, answers: &AnswerMap) -> String {
    let mut text = text.to_string();
    if !text.contains(TOKEN_OPEN) {
        return text;
    }
    for (id, value) in answers.iter() {
        let token = answer_token(id);
        if text.contains(&token) {
            text = replace_unescaped(&text, &token, || value.to_string());
        }
    }
    text
}

fn substitute_uuids(text: &str) -> String {
    replace_unescaped(text, &token(UUID_NAME), || Uuid::new_v4().to_string())
}

fn is_escaped(text: &str, index: usize) -> bool {
    index > 0 && text.as_bytes()[index - 1] == b'\\'
}

fn unescaped_positions(text: &str, token: &str) -> Vec<usize> {
    text.match_indices(token)
        .map(|(index, _)| index)
        .filter(|&index| !is_escaped(text, index))
        .collect()
}

/// Replace every unescaped `token`, asking `value` once per occurrence.
fn replace_unescaped(text: &str, token: &str, mut value: impl FnMut() -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for index in unescaped_positions(text, token) {
        out.push_str(&text[last..index]);
        out.push_str(&value());
        last = index + token.len();
    }
    out.push_str(&text[last..]);
    out
}

/// Call a generator, converting panics into errors.
fn invoke(
    generator: &Arc<dyn PlaceholderGenerator>,
    answers: &AnswerMap,
) -> Result<String, GeneratorError> {
    match panic::catch_unwind(AssertUnwindSafe(|| generator.generate(answers))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".into());
            Err(GeneratorError::new(format!("generator panicked: {message}")))
        }
    }
}
