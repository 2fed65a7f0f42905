//! command
//!
//! Command nodes, positional argument descriptors, and lifecycle hooks.
//!
//! # Modules
//!
//! - [`tree`] - Preparation and token matching over a tree of commands
//!
//! # Design
//!
//! A [`Command`] is built once during application setup and is read-only
//! once its tree has been prepared. A node with no `run` hook and at least
//! one child is a routing group; a node with `run` set is executable whether
//! or not it has children.
//!
//! # Example
//!
//! ```
//! use trellis::command::{Argument, Command};
//! use trellis::core::flags::Flag;
//!
//! let greet = Command::new("greet")
//!     .alias("hi")
//!     .about("Say hello")
//!     .flag(Flag::bool("shout").short('s'))
//!     .unwrap()
//!     .argument(Argument::new("name").required().prompt("Who should I greet?"))
//!     .run(|ctx| {
//!         ctx.write_line(format!("hello {}", ctx.arg("name").unwrap_or("")))?;
//!         Ok(())
//!     });
//!
//! let app = Command::new("app").subcommand(greet);
//! assert_eq!(app.children().len(), 1);
//! ```

pub mod tree;

pub use tree::{CommandMatch, CommandTree, TreeError};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::flags::{Flag, FlagError, FlagSet, Validator};
use crate::engine::ExecutionContext;

/// A lifecycle hook. Errors propagate to the caller unmodified.
pub type Hook = Arc<dyn Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync>;

/// A positional parameter descriptor.
///
/// Required arguments are expected to form a prefix of a command's
/// argument list; interactive backfill stops at the first optional one.
#[derive(Clone)]
pub struct Argument {
    name: String,
    required: bool,
    default: String,
    prompt: String,
    validate: Option<Validator>,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            default: String::new(),
            prompt: String::new(),
            validate: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    /// Label shown when the argument is prompted for.
    pub fn prompt(mut self, label: impl Into<String>) -> Self {
        self.prompt = label.into();
        self
    }

    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    /// Prompt label, falling back to the argument name.
    pub fn label(&self) -> &str {
        if self.prompt.is_empty() {
            &self.name
        } else {
            &self.prompt
        }
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validate.as_ref()
    }

    /// Run the validator, if any, on a supplied value.
    pub fn check(&self, value: &str) -> Result<(), FlagError> {
        match &self.validate {
            Some(check) => check(value).map_err(|message| FlagError::Validation {
                name: self.name.clone(),
                message,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("prompt", &self.prompt)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// One node of the command tree.
#[derive(Clone, Default)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    about: String,
    hidden: bool,
    children: Vec<Command>,
    flags: FlagSet,
    arguments: Vec<Argument>,
    pre_run: Option<Hook>,
    run: Option<Hook>,
    post_run: Option<Hook>,

    // Filled in by `CommandTree::prepare`.
    path: Vec<String>,
    index: HashMap<String, usize>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: vec![name.clone()],
            name,
            ..Self::default()
        }
    }

    /// Another name this command answers to. Matched case-insensitively.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.about = text.into();
        self
    }

    /// Leave the command out of help listings. It still matches.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Register a flag, failing on duplicates and invalid definitions.
    pub fn flag(mut self, flag: Flag) -> Result<Self, FlagError> {
        self.flags.register(flag)?;
        Ok(self)
    }

    pub fn add_flag(&mut self, flag: Flag) -> Result<(), FlagError> {
        self.flags.register(flag)
    }

    /// Make unknown flag tokens an error for this command.
    pub fn strict(mut self, strict: bool) -> Self {
        self.flags.set_strict(strict);
        self
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Append a child. Children keep insertion order.
    pub fn subcommand(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    pub fn pre_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_run = Some(Arc::new(f));
        self
    }

    pub fn run<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(f));
        self
    }

    pub fn post_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&ExecutionContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_run = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn about_text(&self) -> &str {
        &self.about
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn children(&self) -> &[Command] {
        &self.children
    }

    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn pre_run_hook(&self) -> Option<&Hook> {
        self.pre_run.as_ref()
    }

    pub fn run_hook(&self) -> Option<&Hook> {
        self.run.as_ref()
    }

    pub fn post_run_hook(&self) -> Option<&Hook> {
        self.post_run.as_ref()
    }

    pub fn is_runnable(&self) -> bool {
        self.run.is_some()
    }

    /// A node that only routes to its children.
    pub fn is_group(&self) -> bool {
        self.run.is_none() && !self.children.is_empty()
    }

    /// Dotted path from the root, e.g. `app.remote.add`.
    pub fn path(&self) -> String {
        self.path.join(".")
    }

    /// Space-separated path for usage lines, e.g. `app remote add`.
    pub fn usage_path(&self) -> String {
        self.path.join(" ")
    }

    /// True if `token` is this command's name or one of its aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.name.to_lowercase() == token || self.aliases.iter().any(|a| a.to_lowercase() == token)
    }

    /// Index of the child answering to `token`.
    ///
    /// Uses the name index once the tree is prepared and a linear scan
    /// before that; both give the same answer.
    pub fn find_child(&self, token: &str) -> Option<usize> {
        if self.index.is_empty() {
            return self.children.iter().position(|c| c.answers_to(token));
        }
        self.index.get(&token.to_lowercase()).copied()
    }

    /// Number of leading required arguments.
    pub fn required_prefix_len(&self) -> usize {
        self.arguments.iter().take_while(|a| a.required).count()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("path", &self.path())
            .field("aliases", &self.aliases)
            .field("flags", &self.flags.len())
            .field("arguments", &self.arguments)
            .field("children", &self.children)
            .field("runnable", &self.is_runnable())
            .finish()
    }
}
