//! core::flags::precedence
//!
//! Multi-source flag resolution.
//!
//! # Precedence
//!
//! For one flag, first match wins:
//! 1. Command line
//! 2. Explicit environment variable (`Flag::env`)
//! 3. Derived environment variable (`PREFIX_FLAG_NAME`)
//! 4. Config store, keyed by flag name
//! 5. The flag's non-empty default
//!
//! An environment variable set to the empty string is treated as unset.
//!
//! Across scopes a name defined by both the matched command and the root
//! resolves to whichever entry has the better source; on a tie the command's
//! entry wins.
//!
//! # Design
//!
//! Resolution results live in a [`ResolvedFlags`] built fresh for each run.
//! Flag definitions are never mutated, so repeated runs over one command tree
//! cannot observe each other's values.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use super::value::FlagValue;
use super::{Flag, FlagError, FlagSet};
use crate::core::config::ConfigStore;
use crate::core::env::EnvSource;

/// Where a resolved value came from. Ordered from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    CommandLine,
    Env,
    Config,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Source::CommandLine => "command line",
            Source::Env => "environment",
            Source::Config => "config",
            Source::Default => "default",
        };
        f.write_str(s)
    }
}

/// Which registry a flag belongs to. Command sorts before root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Command,
    Root,
}

/// One flag's value for the current run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub value: FlagValue,
    pub source: Source,
    /// Environment variable or config key that supplied the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Introspection row for one resolved flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagReport {
    pub scope: Scope,
    pub name: String,
    pub value: FlagValue,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Values bound during one resolution pass, keyed by scope and flag name.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFlags {
    entries: BTreeMap<(Scope, String), Resolved>,
}

impl ResolvedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scope: Scope, name: &str, resolved: Resolved) {
        trace!(?scope, flag = name, source = %resolved.source, "flag resolved");
        self.entries.insert((scope, name.to_string()), resolved);
    }

    /// The entry for one specific registry.
    pub fn get(&self, scope: Scope, name: &str) -> Option<&Resolved> {
        self.entries.get(&(scope, name.to_string()))
    }

    /// True if the command line bound this specific registry's flag.
    pub fn is_cli_set_in(&self, scope: Scope, name: &str) -> bool {
        self.get(scope, name)
            .is_some_and(|r| r.source == Source::CommandLine)
    }

    /// The winning entry for `name` across all scopes.
    pub fn lookup(&self, name: &str) -> Option<&Resolved> {
        [Scope::Command, Scope::Root]
            .into_iter()
            .filter_map(|scope| self.get(scope, name))
            .min_by_key(|r| r.source)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn is_cli_set(&self, name: &str) -> bool {
        self.source_of(name) == Some(Source::CommandLine)
    }

    pub fn source_of(&self, name: &str) -> Option<Source> {
        self.lookup(name).map(|r| r.source)
    }

    pub fn value(&self, name: &str) -> Option<&FlagValue> {
        self.lookup(name).map(|r| &r.value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(FlagValue::as_str)
    }

    /// Unset boolean flags read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.value(name)
            .and_then(FlagValue::as_bool)
            .unwrap_or(false)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.value(name).and_then(FlagValue::as_int)
    }

    pub fn get_int64(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(FlagValue::as_int64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(FlagValue::as_f64)
    }

    pub fn get_duration(&self, name: &str) -> Option<Duration> {
        self.value(name).and_then(FlagValue::as_duration)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry, command scope first, names sorted.
    pub fn report(&self) -> Vec<FlagReport> {
        self.entries
            .iter()
            .map(|((scope, name), r)| FlagReport {
                scope: *scope,
                name: name.clone(),
                value: r.value.clone(),
                source: r.source,
                origin: r.origin.clone(),
            })
            .collect()
    }
}

/// Environment variable name derived from a prefix and a flag name.
///
/// ```
/// use trellis::core::flags::derive_env_var;
///
/// assert_eq!(derive_env_var("myapp", "dry-run"), "MYAPP_DRY_RUN");
/// assert_eq!(derive_env_var("", "log.level"), "LOG_LEVEL");
/// ```
pub fn derive_env_var(prefix: &str, name: &str) -> String {
    let snake: String = name
        .chars()
        .map(|c| match c {
            '-' | '.' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    if prefix.is_empty() {
        snake
    } else {
        format!("{}_{}", prefix.to_ascii_uppercase(), snake)
    }
}

/// An exported but empty variable counts as unset.
fn env_value(env: &dyn EnvSource, var: &str) -> Option<String> {
    env.var(var).filter(|v| !v.is_empty())
}

/// Fill one flag from environment, config, or default.
///
/// A flag the command line already bound in this scope is left alone, so
/// the merge can be re-applied after parsing without losing CLI values.
pub fn precedence_merge(
    flag: &Flag,
    scope: Scope,
    env_prefix: &str,
    env: &dyn EnvSource,
    config: &dyn ConfigStore,
    resolved: &mut ResolvedFlags,
) -> Result<(), FlagError> {
    if resolved.is_cli_set_in(scope, flag.name()) {
        return Ok(());
    }

    let explicit = flag
        .env_var()
        .and_then(|var| env_value(env, var).map(|v| (v, Source::Env, var.to_string())));
    let found = explicit
        .or_else(|| {
            let var = derive_env_var(env_prefix, flag.name());
            env_value(env, &var).map(|v| (v, Source::Env, var))
        })
        .or_else(|| {
            config
                .get(flag.name())
                .map(|v| (v, Source::Config, flag.name().to_string()))
        });

    let (raw, source, origin) = match found {
        Some((raw, source, origin)) => (raw, source, Some(origin)),
        None if !flag.default_value().is_empty() => {
            (flag.default_value().to_string(), Source::Default, None)
        }
        None => return Ok(()),
    };

    let value = flag.accept(&raw, source)?;
    resolved.insert(
        scope,
        flag.name(),
        Resolved {
            value,
            source,
            origin,
        },
    );
    Ok(())
}

/// Apply [`precedence_merge`] to every flag in a registry.
pub fn merge_all(
    set: &FlagSet,
    scope: Scope,
    env_prefix: &str,
    env: &dyn EnvSource,
    config: &dyn ConfigStore,
    resolved: &mut ResolvedFlags,
) -> Result<(), FlagError> {
    for flag in set.iter() {
        precedence_merge(flag, scope, env_prefix, env, config, resolved)?;
    }
    Ok(())
}
