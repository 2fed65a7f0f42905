//! Trellis - argument resolution for command-line applications
//!
//! Trellis turns a raw argument vector into a fully resolved execution
//! context: a matched command, its flags populated from the command line,
//! the environment, a config store and defaults, and its positional
//! arguments completed, interactively if necessary.
//!
//! # Architecture
//!
//! The codebase is layered, leaves first:
//!
//! - [`core`] - Flag kinds, registry, parser, precedence merge, env and config
//! - [`command`] - Command nodes, arguments, and the command tree matcher
//! - [`ui`] - Prompts, output formats, and help rendering
//! - [`engine`] - The orchestrator that ties one invocation together
//! - [`cli`] - The `trellis` demo application built on the layers above
//!
//! # Correctness Invariants
//!
//! 1. Flag and command definitions are immutable once the tree is prepared
//! 2. Every invocation produces its own resolution result
//! 3. Every input token is consumed by a flag or returned as a positional,
//!    never both
//! 4. No command hook runs unless resolution succeeded completely

pub mod cli;
pub mod command;
pub mod core;
pub mod engine;
pub mod ui;
