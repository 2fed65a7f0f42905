//! ui::prompts
//!
//! Interactive prompts used to backfill missing arguments.
//!
//! # Protocol
//!
//! One call renders `prefix + label` (plus ` [default]` and a hint when
//! present) followed by `": "`, then reads one line. An empty answer with a
//! default returns the default without validation. Otherwise the validator
//! runs; a rejection renders `error_prefix + message` on its own line and the
//! prompt is shown again, until a value passes or input fails.
//!
//! ```text
//! Idle -> Rendering -> AwaitingInput -> Validating -> Accept -> Idle
//!            ^                              |
//!            +----------- Reject -----------+
//! ```
//!
//! A closed input stream is an I/O error and ends the whole backfill.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing::trace;

use crate::core::flags::Validator;
use crate::engine::Cancellation;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled")]
    Aborted,

    #[error("argument '{0}' is required and prompts are disabled")]
    NotInteractive(String),

    #[error("prompt I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Markers used when rendering a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub prefix: String,
    pub hint_prefix: String,
    pub error_prefix: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prefix: "? ".to_string(),
            hint_prefix: String::new(),
            error_prefix: "✗ ".to_string(),
        }
    }
}

impl Theme {
    /// No decoration beyond an `error:` marker.
    pub fn plain() -> Self {
        Self {
            prefix: String::new(),
            hint_prefix: String::new(),
            error_prefix: "error: ".to_string(),
        }
    }
}

/// One question to ask.
#[derive(Clone, Default)]
pub struct PromptRequest {
    pub label: String,
    pub default: Option<String>,
    pub hint: Option<String>,
    pub validator: Option<Validator>,
    /// Yes/no question; the answer is `"true"` or `"false"`.
    pub confirm: bool,
    /// Overrides the prompter's own theme.
    pub theme: Option<Theme>,
}

impl PromptRequest {
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn confirm(label: impl Into<String>, default: Option<bool>) -> Self {
        Self {
            label: label.into(),
            default: default.map(|b| b.to_string()),
            confirm: true,
            ..Self::default()
        }
    }

    /// Empty strings mean "no default".
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        let default = default.into();
        self.default = (!default.is_empty()).then_some(default);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn validate<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.with_validator(Arc::new(f))
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    fn default_bool(&self) -> bool {
        self.default.as_deref() == Some("true")
    }

    /// The prompt line, without a trailing newline.
    pub fn render(&self, theme: &Theme) -> String {
        let mut line = format!("{}{}", theme.prefix, self.label);
        if self.confirm {
            line.push_str(if self.default_bool() {
                " (Y/n)"
            } else {
                " (y/N)"
            });
        } else if let Some(default) = &self.default {
            line.push_str(&format!(" [{default}]"));
        }
        if let Some(hint) = &self.hint {
            line.push_str(&format!(" {}{}", theme.hint_prefix, hint));
        }
        line.push_str(": ");
        line
    }
}

impl fmt::Debug for PromptRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptRequest")
            .field("label", &self.label)
            .field("default", &self.default)
            .field("hint", &self.hint)
            .field("validator", &self.validator.is_some())
            .field("confirm", &self.confirm)
            .finish()
    }
}

/// Something that can ask the user a question.
pub trait Prompter {
    fn prompt(&mut self, cancel: &Cancellation, request: &PromptRequest)
        -> Result<String, PromptError>;
}

/// Interpret a yes/no answer. Empty input takes the default.
pub fn parse_confirm(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Text prompter over any line-oriented reader and writer.
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
    theme: Theme,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            theme: Theme::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Give back the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    fn read_answer(&mut self) -> Result<String, PromptError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn prompt(
        &mut self,
        cancel: &Cancellation,
        request: &PromptRequest,
    ) -> Result<String, PromptError> {
        let theme = request.theme.clone().unwrap_or_else(|| self.theme.clone());
        loop {
            if cancel.is_cancelled() {
                return Err(PromptError::Aborted);
            }
            write!(self.output, "{}", request.render(&theme))?;
            self.output.flush()?;

            let answer = self.read_answer()?;
            trace!(label = %request.label, "prompt answered");

            if request.confirm {
                match parse_confirm(&answer, request.default_bool()) {
                    Some(yes) => return Ok(yes.to_string()),
                    None => {
                        writeln!(self.output, "{}please answer yes or no", theme.error_prefix)?;
                        continue;
                    }
                }
            }

            if answer.is_empty() {
                if let Some(default) = &request.default {
                    return Ok(default.clone());
                }
            }

            if let Some(check) = &request.validator {
                if let Err(message) = check(&answer) {
                    writeln!(self.output, "{}{}", theme.error_prefix, message)?;
                    continue;
                }
            }
            return Ok(answer);
        }
    }
}

/// A prompter that refuses every question.
///
/// Used when the application runs without a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn prompt(
        &mut self,
        _cancel: &Cancellation,
        request: &PromptRequest,
    ) -> Result<String, PromptError> {
        Err(PromptError::NotInteractive(request.label.clone()))
    }
}
