//! Prompter that replays a fixed list of replies.
//!
//! Each prompt consumes one reply, in order. An empty reply accepts the
//! default. Useful for tests and for piping answers into a run.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use steprun_core::{
    application::{ApplicationError, ports::Prompter},
    error::{SteprunError, SteprunResult},
};
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct ScriptedPrompter {
    replies: Arc<Mutex<VecDeque<String>>>,
    asked: Arc<Mutex<Vec<String>>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(Into::into).collect())),
            asked: Arc::default(),
        }
    }

    /// One reply per line of `text`.
    pub fn from_lines(text: &str) -> Self {
        Self::new(text.lines().map(str::trim_end))
    }

    /// Prompts shown so far, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn next(&self, prompt: &str) -> SteprunResult<String> {
        self.asked
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned("prompt log"))?
            .push(prompt.to_string());

        let reply = self
            .replies
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned("prompt replies"))?
            .pop_front()
            .ok_or_else(|| failed(prompt, "no scripted reply left"))?;

        trace!(prompt, reply = %reply, "Scripted reply");
        Ok(reply.trim().to_string())
    }
}

fn failed(prompt: &str, reason: impl Into<String>) -> SteprunError {
    ApplicationError::PromptFailed {
        question_id: prompt.to_string(),
        reason: reason.into(),
    }
    .into()
}

fn parse_bool(reply: &str) -> Option<bool> {
    match reply.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}

/// Option label, or its 1-based position.
fn parse_choice(reply: &str, options: &[String]) -> Option<usize> {
    if let Some(index) = options.iter().position(|o| o == reply) {
        return Some(index);
    }
    reply
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=options.len()).contains(n))
        .map(|n| n - 1)
}

impl Prompter for ScriptedPrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> SteprunResult<String> {
        let reply = self.next(prompt)?;
        match default {
            Some(default) if reply.is_empty() => Ok(default.to_string()),
            _ => Ok(reply),
        }
    }

    fn confirm(&self, prompt: &str, default: Option<bool>) -> SteprunResult<bool> {
        let reply = self.next(prompt)?;
        if reply.is_empty() {
            return default.ok_or_else(|| failed(prompt, "empty reply and no default"));
        }
        parse_bool(&reply).ok_or_else(|| failed(prompt, format!("'{reply}' is not yes or no")))
    }

    fn select(
        &self,
        prompt: &str,
        options: &[String],
        default: Option<usize>,
    ) -> SteprunResult<usize> {
        let reply = self.next(prompt)?;
        if reply.is_empty() {
            return default.ok_or_else(|| failed(prompt, "empty reply and no default"));
        }
        parse_choice(&reply, options)
            .ok_or_else(|| failed(prompt, format!("'{reply}' is not one of the options")))
    }

    fn multiselect(
        &self,
        prompt: &str,
        options: &[String],
        defaults: &[bool],
    ) -> SteprunResult<Vec<usize>> {
        let reply = self.next(prompt)?;
        if reply.is_empty() {
            return Ok(defaults
                .iter()
                .enumerate()
                .filter_map(|(i, &on)| on.then_some(i))
                .collect());
        }

        reply
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                parse_choice(part, options)
                    .ok_or_else(|| failed(prompt, format!("'{part}' is not one of the options")))
            })
            .collect()
    }
}
