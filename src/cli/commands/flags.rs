//! flags command - Show where every resolved flag came from

use anyhow::Result;

use crate::command::Command;
use crate::core::flags::{FlagError, FlagReport, Scope};
use crate::engine::ExecutionContext;
use crate::ui::output::OutputFormat;

pub fn command() -> Result<Command, FlagError> {
    Ok(Command::new("flags")
        .about("Show resolved flags and their sources")
        .strict(true)
        .run(flags))
}

fn flags(ctx: &ExecutionContext) -> Result<()> {
    let report = ctx.flags().report();
    match ctx.format() {
        OutputFormat::Json => ctx.write_line(serde_json::to_string_pretty(&report)?)?,
        OutputFormat::Yaml => ctx.write(serde_yaml::to_string(&report)?)?,
        OutputFormat::Text => {
            for row in &report {
                ctx.write_line(text_row(row))?;
            }
        }
    }
    Ok(())
}

fn text_row(row: &FlagReport) -> String {
    let scope = match row.scope {
        Scope::Command => "command",
        Scope::Root => "root",
    };
    let mut line = format!("{:<8} {:<10} {:<12} {}", scope, row.name, row.value, row.source);
    if let Some(origin) = &row.origin {
        line.push_str(&format!(" ({origin})"));
    }
    line
}
