//! greet command - Print a greeting, prompting for the name if missing

use anyhow::Result;
use serde::Serialize;

use crate::cli::verbosity;
use crate::command::{Argument, Command};
use crate::core::flags::{Flag, FlagError};
use crate::engine::ExecutionContext;
use crate::ui::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
struct Greeting<'a> {
    message: &'a str,
    times: i32,
}

pub fn command() -> Result<Command, FlagError> {
    Ok(Command::new("greet")
        .alias("hi")
        .about("Print a greeting")
        .strict(true)
        .flag(Flag::bool("shout").short('s').usage("print in upper case"))?
        .flag(
            Flag::int("times")
                .short('n')
                .default("1")
                .usage("how many times to greet")
                .validate(at_least_one),
        )?
        .argument(Argument::new("name").required().prompt("Who should I greet?"))
        .argument(Argument::new("greeting").default("Hello"))
        .run(greet))
}

fn at_least_one(raw: &str) -> Result<(), String> {
    match raw.trim().parse::<i32>() {
        Ok(n) if n >= 1 => Ok(()),
        Ok(_) => Err("must be at least 1".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn greet(ctx: &ExecutionContext) -> Result<()> {
    let name = ctx.arg("name").unwrap_or_default();
    let greeting = ctx.arg("greeting").unwrap_or("Hello");
    let times = ctx.flags().get_int("times").unwrap_or(1);

    let mut message = format!("{greeting}, {name}!");
    if ctx.flags().get_bool("shout") {
        message = message.to_uppercase();
    }
    output::debug(format!("greeting {name} {times} time(s)"), verbosity(ctx));

    let record = Greeting {
        message: &message,
        times,
    };
    match ctx.format() {
        OutputFormat::Text => {
            for _ in 0..times {
                ctx.write_line(&message)?;
            }
        }
        OutputFormat::Json => ctx.write_line(serde_json::to_string(&record)?)?,
        OutputFormat::Yaml => ctx.write(serde_yaml::to_string(&record)?)?,
    }
    Ok(())
}
