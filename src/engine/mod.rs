//! engine
//!
//! Orchestrates one invocation: Match -> Merge -> Parse -> Backfill -> Hooks.
//!
//! # Architecture
//!
//! [`runner::App`] owns the command tree and the collaborators flag
//! resolution needs (environment, config store, prompter, help renderer,
//! output sink). Each call to [`runner::App::run`] builds a fresh
//! [`ExecutionContext`] and hands it to the matched command's hooks:
//!
//! ```text
//! argv -> match -> scoped parse -> help/version -> root merge -> command merge
//!      -> positionals -> backfill -> pre_run -> run -> post_run
//! ```
//!
//! # Invariants
//!
//! - No hook runs unless resolution succeeded completely
//! - Hooks run in order and the first error stops the chain
//! - Resolution never mutates the command tree after `prepare`
//!
//! # Example
//!
//! ```
//! use trellis::command::{Argument, Command};
//! use trellis::engine::{App, Outcome};
//!
//! let root = Command::new("app").subcommand(
//!     Command::new("hello")
//!         .argument(Argument::new("name").default("world"))
//!         .run(|ctx| {
//!             ctx.write_line(format!("hello {}", ctx.arg("name").unwrap_or("")))?;
//!             Ok(())
//!         }),
//! );
//!
//! let mut app = App::builder(root)
//!     .output(std::io::sink())
//!     .interactive(false)
//!     .build()
//!     .unwrap();
//! let outcome = app.run(["hello"]).unwrap();
//! assert_eq!(outcome, Outcome::Executed);
//! ```

pub mod backfill;
pub mod runner;

pub use backfill::backfill;
pub use runner::{App, AppBuilder, Outcome, Resolution, RunError};

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::config::ConfigStore;
use crate::core::flags::ResolvedFlags;
use crate::ui::output::OutputFormat;

/// Config store shared between the application and its handlers.
pub type SharedConfig = Rc<RefCell<Box<dyn ConfigStore>>>;

/// Output sink shared between the application and its handlers.
pub type SharedOutput = Rc<RefCell<Box<dyn Write>>>;

/// Cooperative cancellation signal.
///
/// Clones share one flag. Resolution itself never checks it; prompts check
/// it before each read, and long-running handlers are expected to poll it.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything a command handler sees for one invocation.
///
/// Built fresh by the orchestrator for every run and dropped afterwards.
pub struct ExecutionContext {
    pub(crate) indices: Vec<usize>,
    path: String,
    usage_path: String,
    args: Vec<String>,
    named: BTreeMap<String, String>,
    flags: ResolvedFlags,
    env_prefix: String,
    config: SharedConfig,
    config_path: Option<PathBuf>,
    output: SharedOutput,
    cancel: Cancellation,
    format: OutputFormat,
}

impl ExecutionContext {
    /// Dotted path of the matched command, e.g. `app.config.set`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Space-separated path of the matched command, for messages.
    pub fn usage_path(&self) -> &str {
        &self.usage_path
    }

    /// Positional values in order: supplied first, then backfilled.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Value of a declared argument, including an unfilled optional
    /// argument's default.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }

    pub fn named_args(&self) -> &BTreeMap<String, String> {
        &self.named
    }

    /// Resolved flags for both the matched command and the root.
    pub fn flags(&self) -> &ResolvedFlags {
        &self.flags
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn config(&self) -> Ref<'_, dyn ConfigStore> {
        Ref::map(self.config.borrow(), |c| &**c)
    }

    pub fn config_mut(&self) -> RefMut<'_, dyn ConfigStore> {
        RefMut::map(self.config.borrow_mut(), |c| &mut **c)
    }

    /// File the config store was loaded from, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Encoding requested with `--format`.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn cancellation(&self) -> &Cancellation {
        &self.cancel
    }

    /// Write one line to the application's output sink.
    pub fn write_line(&self, line: impl fmt::Display) -> io::Result<()> {
        writeln!(self.output.borrow_mut(), "{line}")
    }

    /// Write to the output sink without a trailing newline.
    pub fn write(&self, text: impl fmt::Display) -> io::Result<()> {
        write!(self.output.borrow_mut(), "{text}")
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("path", &self.path)
            .field("args", &self.args)
            .field("named", &self.named)
            .field("flags", &self.flags)
            .field("env_prefix", &self.env_prefix)
            .field("config_path", &self.config_path)
            .field("format", &self.format)
            .finish()
    }
}
