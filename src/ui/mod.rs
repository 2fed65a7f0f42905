//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive prompts used to backfill arguments
//! - [`output`] - Messages, output formats, and help rendering
//!
//! # Design
//!
//! Everything a user reads or types goes through this module, so the
//! interactive and non-interactive paths stay consistent. The resolution
//! core only depends on the [`prompts::Prompter`] and
//! [`output::HelpRenderer`] traits.

pub mod output;
pub mod prompts;
