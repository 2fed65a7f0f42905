//! core
//!
//! Flag model, value sources, and configuration for trellis.
//!
//! # Modules
//!
//! - [`flags`] - Flag definitions, registry, parser, and precedence merge
//! - [`env`] - Environment variable access
//! - [`config`] - String key/value configuration store
//!
//! # Design Principles
//!
//! - Definitions are immutable once registered
//! - Every run produces its own resolution result
//! - Coercion is centralized per flag kind

pub mod config;
pub mod env;
pub mod flags;
