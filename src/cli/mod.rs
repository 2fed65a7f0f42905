//! cli
//!
//! The `trellis` demo application.
//!
//! # Responsibilities
//!
//! - Declare the command tree and global flags
//! - Point the config store at `$TRELLIS_CONFIG` or the default location
//! - Hand the process arguments to the [`crate::engine::App`] orchestrator
//!
//! # Architecture
//!
//! The CLI layer is thin. Resolution, prompting, and help all happen in the
//! engine; handlers in [`commands`] only read the [`ExecutionContext`] and
//! write results in the requested `--format`.

pub mod commands;

use std::path::PathBuf;

use crate::command::Command;
use crate::core::config::{ConfigError, TomlConfigStore};
use crate::core::flags::{Flag, FlagError};
use crate::engine::{App, ExecutionContext, RunError};
use crate::ui::output::Verbosity;

/// Application name, also the root command.
pub const APP_NAME: &str = "trellis";

/// Prefix for derived flag environment variables.
pub const ENV_PREFIX: &str = "TRELLIS";

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "TRELLIS_CONFIG";

/// Log filter for diagnostics, in `tracing_subscriber::EnvFilter` syntax.
pub const LOG_ENV: &str = "TRELLIS_LOG";

/// The full command tree.
pub fn root() -> Result<Command, FlagError> {
    Ok(Command::new(APP_NAME)
        .about("Resolve flags, arguments, and config for a small demo app")
        .flag(Flag::bool("debug").usage("print debug messages"))?
        .flag(Flag::bool("quiet").short('q').usage("minimal output"))?
        .subcommand(commands::greet::command()?)
        .subcommand(commands::config_cmd::command()?)
        .subcommand(commands::flags::command()?))
}

/// Config file location: `$TRELLIS_CONFIG`, else the platform default.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => TomlConfigStore::default_path(APP_NAME),
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<(), RunError> {
    let mut app = App::builder(root()?)
        .version(env!("CARGO_PKG_VERSION"))
        .env_prefix(ENV_PREFIX)
        .config_path(config_path()?)
        .build()?;
    app.run_env()?;
    Ok(())
}

/// Output verbosity from the global `--quiet` and `--debug` flags.
pub(crate) fn verbosity(ctx: &ExecutionContext) -> Verbosity {
    Verbosity::from_flags(ctx.flags().get_bool("quiet"), ctx.flags().get_bool("debug"))
}
