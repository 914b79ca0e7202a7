//! Prompters that talk to a person.
//!
//! - [`TerminalPrompter`]: dialoguer widgets, used on a TTY (`interactive`
//!   feature)
//! - [`LinePrompter`]: one line of stdin per question, used when stdin is
//!   piped or the feature is off

use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use steprun_adapters::ScriptedPrompter;
use steprun_core::{
    application::{ApplicationError, ports::Prompter},
    error::{SteprunError, SteprunResult},
};

fn prompt_failed(prompt: &str, reason: impl ToString) -> SteprunError {
    ApplicationError::PromptFailed {
        question_id: prompt.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

// ── TerminalPrompter ──────────────────────────────────────────────────────────

#[cfg(feature = "interactive")]
pub use terminal::TerminalPrompter;

#[cfg(feature = "interactive")]
mod terminal {
    use super::*;
    use dialoguer::{Confirm, Input, MultiSelect, Select, theme::ColorfulTheme};

    /// Interactive prompts on the controlling terminal.
    ///
    /// Esc and Ctrl-C both cancel the run.
    #[derive(Default)]
    pub struct TerminalPrompter {
        theme: ColorfulTheme,
    }

    impl TerminalPrompter {
        pub fn new() -> Self {
            Self::default()
        }
    }

    fn map_error(prompt: &str, err: dialoguer::Error) -> SteprunError {
        match err {
            dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => {
                ApplicationError::Cancelled.into()
            }
            other => prompt_failed(prompt, other),
        }
    }

    fn cancelled() -> SteprunError {
        ApplicationError::Cancelled.into()
    }

    impl Prompter for TerminalPrompter {
        fn input(&self, prompt: &str, default: Option<&str>) -> SteprunResult<String> {
            let mut input = Input::<String>::with_theme(&self.theme)
                .with_prompt(prompt)
                .allow_empty(true);
            if let Some(default) = default {
                input = input.default(default.to_string());
            }
            input.interact_text().map_err(|e| map_error(prompt, e))
        }

        fn confirm(&self, prompt: &str, default: Option<bool>) -> SteprunResult<bool> {
            let mut confirm = Confirm::with_theme(&self.theme).with_prompt(prompt);
            if let Some(default) = default {
                confirm = confirm.default(default);
            }
            confirm
                .interact_opt()
                .map_err(|e| map_error(prompt, e))?
                .ok_or_else(cancelled)
        }

        fn select(
            &self,
            prompt: &str,
            options: &[String],
            default: Option<usize>,
        ) -> SteprunResult<usize> {
            Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(options)
                .default(default.unwrap_or(0))
                .interact_opt()
                .map_err(|e| map_error(prompt, e))?
                .ok_or_else(cancelled)
        }

        fn multiselect(
            &self,
            prompt: &str,
            options: &[String],
            defaults: &[bool],
        ) -> SteprunResult<Vec<usize>> {
            MultiSelect::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(options)
                .defaults(defaults)
                .interact_opt()
                .map_err(|e| map_error(prompt, e))?
                .ok_or_else(cancelled)
        }
    }
}

// ── LinePrompter ──────────────────────────────────────────────────────────────

/// Reads one reply line per question.
///
/// Replies follow the same rules as [`ScriptedPrompter`]: empty takes the
/// default, select accepts a label or 1-based number, multiselect takes
/// comma-separated choices. End of input cancels the run.
pub struct LinePrompter {
    input: Mutex<Box<dyn BufRead + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl LinePrompter {
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Prompts on stderr, replies from stdin.
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stderr())
    }

    /// Show the prompt and read one reply as a single-reply script.
    fn ask(&self, prompt: &str, hint: &str, options: &[String]) -> SteprunResult<ScriptedPrompter> {
        {
            let mut out = self
                .output
                .lock()
                .map_err(|_| ApplicationError::LockPoisoned("prompt output"))?;
            for (i, option) in options.iter().enumerate() {
                writeln!(out, "  {}) {option}", i + 1).map_err(|e| prompt_failed(prompt, e))?;
            }
            write!(out, "{prompt}{hint} ").map_err(|e| prompt_failed(prompt, e))?;
            out.flush().map_err(|e| prompt_failed(prompt, e))?;
        }

        let mut line = String::new();
        let read = self
            .input
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned("prompt input"))?
            .read_line(&mut line)
            .map_err(|e| prompt_failed(prompt, e))?;

        if read == 0 {
            return Err(ApplicationError::Cancelled.into());
        }
        Ok(ScriptedPrompter::new([line.trim_end_matches(['\r', '\n'])]))
    }
}

impl Prompter for LinePrompter {
    fn input(&self, prompt: &str, default: Option<&str>) -> SteprunResult<String> {
        let hint = default.map(|d| format!(" [{d}]")).unwrap_or_default();
        self.ask(prompt, &hint, &[])?.input(prompt, default)
    }

    fn confirm(&self, prompt: &str, default: Option<bool>) -> SteprunResult<bool> {
        let hint = match default {
            Some(true) => " [Y/n]",
            Some(false) => " [y/N]",
            None => " [y/n]",
        };
        self.ask(prompt, hint, &[])?.confirm(prompt, default)
    }

    fn select(
        &self,
        prompt: &str,
        options: &[String],
        default: Option<usize>,
    ) -> SteprunResult<usize> {
        let hint = default
            .and_then(|i| options.get(i))
            .map(|d| format!(" [{d}]"))
            .unwrap_or_default();
        self.ask(prompt, &hint, options)?
            .select(prompt, options, default)
    }

    fn multiselect(
        &self,
        prompt: &str,
        options: &[String],
        defaults: &[bool],
    ) -> SteprunResult<Vec<usize>> {
        self.ask(prompt, " (comma-separated)", options)?
            .multiselect(prompt, options, defaults)
    }
}
