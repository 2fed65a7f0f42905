//! trellis - demo command-line application built on the trellis library.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use trellis::ui::output;

fn main() -> ExitCode {
    init_tracing();
    match trellis::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&err);
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

/// Diagnostics go to stderr, filtered by `TRELLIS_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(trellis::cli::LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
