//! core::env
//!
//! Environment variable access.
//!
//! Flag resolution reads the environment through [`EnvSource`] so a run can
//! be driven by an explicit map instead of the process environment.

use std::collections::HashMap;

/// Read-only view of environment variables.
pub trait EnvSource {
    /// Value of `name`, or `None` if unset or not valid unicode.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
