//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Diagnostics go to stderr and respect the quiet and debug flags; results
//! go to the application's output sink. The `--format` root flag
//! selects how command handlers should encode structured output; encoding
//! itself belongs to the handlers. Help text goes through a [`HelpRenderer`]
//! so applications can replace the plain layout.

use std::fmt::{self, Display};
use std::io::{self, Write};
use std::str::FromStr;

use serde::Serialize;

use crate::command::Command;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Structured output encoding requested with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Text,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 3] = ["json", "yaml", "text"];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Text => "text",
        }
    }

    /// Flag validator restricting values to [`OutputFormat::NAMES`].
    pub fn validate(raw: &str) -> Result<(), String> {
        raw.parse::<OutputFormat>().map(|_| ())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!(
                "unsupported format '{}', must be one of: {}",
                other,
                Self::NAMES.join(", ")
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Writes help for a command.
pub trait HelpRenderer {
    fn render(&self, command: &Command, out: &mut dyn Write) -> io::Result<()>;
}

/// Unstyled help: usage, description, subcommands, flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHelp;

impl HelpRenderer for PlainHelp {
    fn render(&self, command: &Command, out: &mut dyn Write) -> io::Result<()> {
        if !command.about_text().is_empty() {
            writeln!(out, "{}\n", command.about_text())?;
        }

        let mut usage = format!("Usage: {}", command.usage_path());
        if command.children().iter().any(|c| !c.is_hidden()) {
            usage.push_str(" <command>");
        }
        for arg in command.arguments() {
            if arg.is_required() {
                usage.push_str(&format!(" <{}>", arg.name()));
            } else {
                usage.push_str(&format!(" [{}]", arg.name()));
            }
        }
        if !command.flags().is_empty() {
            usage.push_str(" [flags]");
        }
        writeln!(out, "{usage}")?;

        let children: Vec<&Command> = command.children().iter().filter(|c| !c.is_hidden()).collect();
        if !children.is_empty() {
            writeln!(out, "\nCommands:")?;
            let width = children.iter().map(|c| c.name().len()).max().unwrap_or(0);
            for child in children {
                writeln!(out, "  {:width$}  {}", child.name(), child.about_text())?;
            }
        }

        let flags: Vec<_> = command.flags().iter().filter(|f| !f.is_hidden()).collect();
        if !flags.is_empty() {
            writeln!(out, "\nFlags:")?;
            let specs: Vec<String> = flags
                .iter()
                .map(|f| {
                    let short = f
                        .short_alias()
                        .map(|c| format!("-{c}, "))
                        .unwrap_or_else(|| "    ".to_string());
                    if f.is_bool() {
                        format!("{short}--{}", f.name())
                    } else {
                        format!("{short}--{} {}", f.name(), f.kind())
                    }
                })
                .collect();
            let width = specs.iter().map(String::len).max().unwrap_or(0);
            for (spec, flag) in specs.iter().zip(flags) {
                let mut line = format!("  {spec:width$}  {}", flag.usage_text());
                if !flag.default_value().is_empty() {
                    line.push_str(&format!(" (default {})", flag.default_value()));
                }
                writeln!(out, "{}", line.trim_end())?;
            }
        }
        Ok(())
    }
}
