//! engine::runner
//!
//! The application orchestrator - the single entry point for an invocation.
//!
//! # Lifecycle
//!
//! ```text
//! prepare -> load config -> match -> parse [command, root]
//!   -> --version / --help -> root merge -> command merge -> route
//!   -> positionals -> required flags -> argument checks -> backfill
//!   -> pre_run -> run -> post_run
//! ```
//!
//! # Invariants
//!
//! - Nothing is partially applied: a failing step stops the invocation and
//!   no later step runs
//! - Hooks only ever see a fully resolved [`ExecutionContext`]
//! - Handler errors are returned unmodified as [`RunError::Handler`]
//!
//! # Routing
//!
//! A group (children, no `run`) with nothing left to route renders help.
//! Leftover words under a group are an unknown command; if at least one
//! subcommand matched, that node's help is written before the error is
//! returned. A runnable node with children runs itself when no child matched
//! and it declares arguments to absorb leftover words.

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use thiserror::Error;
use tracing::debug;

use super::backfill::backfill;
use super::{Cancellation, ExecutionContext, SharedConfig, SharedOutput};
use crate::command::{Command, CommandTree, TreeError};
use crate::core::config::{ConfigError, ConfigStore, TomlConfigStore};
use crate::core::env::{EnvSource, ProcessEnv};
use crate::core::flags::precedence::merge_all;
use crate::core::flags::{Flag, FlagError, FlagScopes, ResolvedFlags, Scope};
use crate::ui::output::{HelpRenderer, OutputFormat, PlainHelp};
use crate::ui::prompts::{LinePrompter, PromptError, Prompter};

/// Errors from an invocation.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Flag(#[from] FlagError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    /// Returned by a `pre_run`, `run`, or `post_run` hook.
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl RunError {
    /// True when the invocation itself was malformed.
    pub fn is_usage_error(&self) -> bool {
        match self {
            RunError::Tree(TreeError::UnknownCommand { .. }) => true,
            RunError::Flag(e) => e.is_usage_error(),
            _ => false,
        }
    }

    /// Process exit code: 2 for usage errors, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_usage_error() {
            2
        } else {
            1
        }
    }
}

/// What [`App::resolve`] produced.
#[derive(Debug)]
pub enum Resolution {
    /// Ready to run the matched command's hooks.
    Ready(Box<ExecutionContext>),
    /// Help was written to the output sink.
    Help,
    /// The version line was written to the output sink.
    Version,
}

/// What [`App::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Executed,
    Help,
    Version,
}

/// Builder for [`App`].
pub struct AppBuilder {
    root: Command,
    version: Option<String>,
    env_prefix: String,
    env: Box<dyn EnvSource>,
    config: Box<dyn ConfigStore>,
    config_path: Option<PathBuf>,
    prompter: Option<Box<dyn Prompter>>,
    interactive: bool,
    help: Box<dyn HelpRenderer>,
    output: Box<dyn Write>,
    cancel: Cancellation,
}

impl AppBuilder {
    /// Enables `--version`, printing `<root name> <version>`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Prefix for derived environment variables (`PREFIX_FLAG_NAME`).
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn config_store(mut self, store: impl ConfigStore + 'static) -> Self {
        self.config = Box::new(store);
        self
    }

    /// File loaded into the config store before the first resolution.
    /// A missing file is skipped.
    pub fn config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Prompter used for backfill. Defaults to stdin/stderr.
    pub fn prompter(mut self, prompter: impl Prompter + 'static) -> Self {
        self.prompter = Some(Box::new(prompter));
        self
    }

    /// When false, missing required arguments fail instead of prompting.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn help_renderer(mut self, renderer: impl HelpRenderer + 'static) -> Self {
        self.help = Box::new(renderer);
        self
    }

    /// Sink for help, version, and handler output. Defaults to stdout.
    pub fn output(mut self, output: impl Write + 'static) -> Self {
        self.output = Box::new(output);
        self
    }

    pub fn cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Register the root flags and build the application.
    pub fn build(self) -> Result<App, RunError> {
        let mut root = self.root;
        let name = root.name().to_string();

        // `help` is added to every node, root included, by `prepare`.
        root.add_flag(
            Flag::string("format")
                .default("text")
                .usage(format!("output format ({})", OutputFormat::NAMES.join(", ")))
                .validate(OutputFormat::validate),
        )?;
        if self.version.is_some() {
            root.add_flag(Flag::bool("version").usage(format!("version for {name}")))?;
        }

        Ok(App {
            tree: CommandTree::new(root),
            version: self.version,
            env_prefix: self.env_prefix,
            env: self.env,
            config: Rc::new(RefCell::new(self.config)),
            config_path: self.config_path,
            config_loaded: false,
            prompter: self.prompter,
            interactive: self.interactive,
            help: self.help,
            output: Rc::new(RefCell::new(self.output)),
            cancel: self.cancel,
        })
    }
}

/// A command tree plus everything needed to resolve and run it.
pub struct App {
    tree: CommandTree,
    version: Option<String>,
    env_prefix: String,
    env: Box<dyn EnvSource>,
    config: SharedConfig,
    config_path: Option<PathBuf>,
    config_loaded: bool,
    prompter: Option<Box<dyn Prompter>>,
    interactive: bool,
    help: Box<dyn HelpRenderer>,
    output: SharedOutput,
    cancel: Cancellation,
}

impl App {
    /// Start building an application around `root`.
    ///
    /// Defaults: process environment, empty in-memory config, stdin/stderr
    /// prompts, plain help, stdout.
    pub fn builder(root: Command) -> AppBuilder {
        AppBuilder {
            root,
            version: None,
            env_prefix: String::new(),
            env: Box::new(ProcessEnv),
            config: Box::new(TomlConfigStore::new()),
            config_path: None,
            prompter: None,
            interactive: true,
            help: Box::new(PlainHelp),
            output: Box::new(io::stdout()),
            cancel: Cancellation::new(),
        }
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn config(&self) -> Ref<'_, dyn ConfigStore> {
        Ref::map(self.config.borrow(), |c| &**c)
    }

    /// Handle for cancelling prompts and handlers from elsewhere.
    pub fn cancellation(&self) -> Cancellation {
        self.cancel.clone()
    }

    /// Run with the process arguments, skipping the program name.
    pub fn run_env(&mut self) -> Result<Outcome, RunError> {
        self.run(std::env::args().skip(1))
    }

    /// Resolve `args` and invoke the matched command's hooks.
    pub fn run<I, S>(&mut self, args: I) -> Result<Outcome, RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ctx = match self.resolve(args)? {
            Resolution::Ready(ctx) => *ctx,
            Resolution::Help => return Ok(Outcome::Help),
            Resolution::Version => return Ok(Outcome::Version),
        };

        let command = self.tree.command_at(&ctx.indices);
        let hooks = [
            ("pre_run", command.pre_run_hook()),
            ("run", command.run_hook()),
            ("post_run", command.post_run_hook()),
        ];
        for (stage, hook) in hooks {
            let Some(hook) = hook else {
                continue;
            };
            debug!(command = ctx.path(), stage, "invoking hook");
            hook(&ctx).map_err(RunError::Handler)?;
        }

        self.output.borrow_mut().flush()?;
        Ok(Outcome::Executed)
    }

    /// Everything up to, but not including, hook invocation.
    pub fn resolve<I, S>(&mut self, args: I) -> Result<Resolution, RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        self.tree.prepare()?;
        self.load_config()?;

        let m = self.tree.match_tokens(&tokens);
        let root = self.tree.root();
        let command = self.tree.command(&m);
        let own_scope = if m.is_root() { Scope::Root } else { Scope::Command };
        debug!(command = %command.path(), remaining = m.remaining.len(), "command matched");

        let mut resolved = ResolvedFlags::new();
        let mut layers = Vec::with_capacity(2);
        if !m.is_root() {
            layers.push((Scope::Command, command.flags()));
        }
        layers.push((Scope::Root, root.flags()));
        let parsed = FlagScopes::new(layers).parse(&m.remaining, &mut resolved)?;

        // Only command-line values are bound here, so a bad environment or
        // config value cannot block --version or --help.
        if self.version.is_some() && resolved.is_cli_set_in(Scope::Root, "version") {
            let version = self.version.as_deref().unwrap_or_default();
            writeln!(self.output.borrow_mut(), "{} {}", root.name(), version)?;
            return Ok(Resolution::Version);
        }
        if resolved.is_cli_set("help") {
            self.render_help(command)?;
            return Ok(Resolution::Help);
        }

        self.merge(root, Scope::Root, &mut resolved)?;
        if !m.is_root() {
            self.merge(command, Scope::Command, &mut resolved)?;
        }

        if !command.is_runnable() {
            if command.children().is_empty() {
                return Err(TreeError::NoRunHandler(command.path()).into());
            }
            if parsed.positionals.is_empty() {
                self.render_help(command)?;
                return Ok(Resolution::Help);
            }
            return Err(self.unknown_command(&m.indices, command, &parsed.positionals)?);
        }

        let mut values = command
            .flags()
            .map_positionals(own_scope, &parsed.positionals, &mut resolved)?;
        if !command.children().is_empty() && command.arguments().is_empty() && !values.is_empty()
        {
            return Err(self.unknown_command(&m.indices, command, &values)?);
        }

        command.flags().check_required(own_scope, &resolved)?;
        if !m.is_root() {
            root.flags().check_required(Scope::Root, &resolved)?;
        }

        for (arg, value) in command.arguments().iter().zip(&values) {
            arg.check(value)?;
        }

        let short = values.len() < command.required_prefix_len();
        if short && self.interactive && self.prompter.is_none() {
            self.prompter = Some(Box::new(LinePrompter::stdio()));
        }
        let prompter = match self.prompter.as_mut() {
            Some(p) if self.interactive => Some(&mut **p as &mut dyn Prompter),
            _ => None,
        };
        backfill(command.arguments(), &mut values, prompter, &self.cancel)?;

        let mut named = BTreeMap::new();
        for (i, arg) in command.arguments().iter().enumerate() {
            match values.get(i) {
                Some(value) => {
                    named.insert(arg.name().to_string(), value.clone());
                }
                None if !arg.default_value().is_empty() => {
                    named.insert(arg.name().to_string(), arg.default_value().to_string());
                }
                None => {}
            }
        }

        let format = resolved
            .get(Scope::Root, "format")
            .and_then(|r| r.value.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        debug!(command = %command.path(), args = values.len(), flags = resolved.len(), "resolved");
        Ok(Resolution::Ready(Box::new(ExecutionContext {
            indices: m.indices.clone(),
            path: command.path(),
            usage_path: command.usage_path(),
            args: values,
            named,
            flags: resolved,
            env_prefix: self.env_prefix.clone(),
            config: Rc::clone(&self.config),
            config_path: self.config_path.clone(),
            output: Rc::clone(&self.output),
            cancel: self.cancel.clone(),
            format,
        })))
    }

    fn load_config(&mut self) -> Result<(), ConfigError> {
        if self.config_loaded {
            return Ok(());
        }
        if let Some(path) = &self.config_path {
            if path.exists() {
                self.config.borrow_mut().load(path)?;
            } else {
                debug!(path = %path.display(), "config file not found, skipping");
            }
        }
        self.config_loaded = true;
        Ok(())
    }

    fn merge(
        &self,
        command: &Command,
        scope: Scope,
        resolved: &mut ResolvedFlags,
    ) -> Result<(), FlagError> {
        let config = self.config.borrow();
        merge_all(
            command.flags(),
            scope,
            &self.env_prefix,
            &*self.env,
            &**config,
            resolved,
        )
    }

    fn render_help(&self, command: &Command) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        self.help.render(command, &mut **out)?;
        out.flush()
    }

    /// Build the unknown-command error, writing the matched node's help
    /// first when a subcommand was matched.
    fn unknown_command(
        &self,
        indices: &[usize],
        command: &Command,
        words: &[String],
    ) -> Result<RunError, RunError> {
        if !indices.is_empty() {
            self.render_help(command)?;
        }
        Ok(TreeError::UnknownCommand {
            command: words.join(" "),
            parent: command.usage_path(),
        }
        .into())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root", &self.tree.root().name())
            .field("version", &self.version)
            .field("env_prefix", &self.env_prefix)
            .field("config_path", &self.config_path)
            .field("interactive", &self.interactive)
            .finish()
    }
}
