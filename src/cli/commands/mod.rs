//! cli::commands
//!
//! Command definitions and handlers.
//!
//! Each module exposes `command()`, building its node of the tree, and
//! private handlers that:
//! 1. Read arguments and flags from the execution context
//! 2. Do the work
//! 3. Write the result in the requested output format

pub mod config_cmd;
pub mod flags;
pub mod greet;
