//! config command - Get or set configuration values

use anyhow::{anyhow, bail, Context as _, Result};

use crate::cli::verbosity;
use crate::command::{Argument, Command};
use crate::core::flags::FlagError;
use crate::engine::ExecutionContext;
use crate::ui::output::{self, OutputFormat, Verbosity};

pub fn command() -> Result<Command, FlagError> {
    Ok(Command::new("config")
        .alias("cfg")
        .about("Read and write the config file")
        .subcommand(
            Command::new("get")
                .about("Print a configuration value")
                .strict(true)
                .argument(Argument::new("key").required().prompt("Key"))
                .run(get),
        )
        .subcommand(
            Command::new("set")
                .about("Store a configuration value")
                .strict(true)
                .argument(Argument::new("key").required().prompt("Key"))
                .argument(Argument::new("value").required().prompt("Value"))
                .run(set),
        ))
}

/// Get a configuration value.
fn get(ctx: &ExecutionContext) -> Result<()> {
    let key = ctx.arg("key").unwrap_or_default();
    let Some(value) = ctx.config().get(key) else {
        bail!("Unknown configuration key: {}", key);
    };

    match ctx.format() {
        OutputFormat::Json => {
            ctx.write_line(serde_json::json!({ "key": key, "value": value }))?;
        }
        OutputFormat::Yaml => {
            let mut map = std::collections::BTreeMap::new();
            map.insert(key, value.as_str());
            ctx.write(serde_yaml::to_string(&map)?)?;
        }
        OutputFormat::Text => ctx.write_line(value)?,
    }
    Ok(())
}

/// Set a configuration value and write the file.
fn set(ctx: &ExecutionContext) -> Result<()> {
    let key = ctx.arg("key").unwrap_or_default();
    let value = ctx.arg("value").unwrap_or_default();
    if key.is_empty() {
        bail!("Configuration key cannot be empty");
    }
    let path = ctx
        .config_path()
        .ok_or_else(|| anyhow!("No config file location"))?;

    ctx.config_mut().set(key, value);
    ctx.config()
        .save(path)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    let verbosity = verbosity(ctx);
    output::debug(format!("wrote {}", path.display()), verbosity);
    if verbosity != Verbosity::Quiet {
        ctx.write_line(format!("Set {} = {}", key, value))?;
    }
    Ok(())
}
