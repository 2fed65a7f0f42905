//! core::flags
//!
//! Flag definitions and the per-command flag registry.
//!
//! # Modules
//!
//! - [`value`] - Flag kinds and string coercion
//! - [`parser`] - Token scanning and positional mapping
//! - [`precedence`] - Environment/config/default merge and resolved values
//!
//! # Design
//!
//! A [`Flag`] is an immutable description. It never holds the value bound
//! during a run; binding produces entries in a [`ResolvedFlags`] owned by
//! that run. A [`FlagSet`] is built once at setup time and only read
//! afterwards.
//!
//! # Invariants
//!
//! - Names and short aliases are unique within one registry
//! - Boolean flags are never positional
//! - A flag's non-empty default always coerces to its kind
//! - Positional flags keep registration order
//!
//! # Example
//!
//! ```
//! use trellis::core::flags::{Flag, FlagSet};
//!
//! let mut flags = FlagSet::new();
//! flags.register(Flag::string("name").short('n')).unwrap();
//! flags.register(Flag::bool("verbose").short('v')).unwrap();
//!
//! // Short aliases must be unique.
//! assert!(flags.register(Flag::int("number").short('n')).is_err());
//! ```

pub mod parser;
pub mod precedence;
pub mod value;

pub use parser::{FlagScopes, ParseOutcome};
pub use precedence::{derive_env_var, FlagReport, Resolved, ResolvedFlags, Scope, Source};
pub use value::{coerce, CoerceError, FlagKind, FlagValue};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A user-supplied check run on a raw value after it coerces.
pub type Validator = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;

/// Errors from flag registration, parsing, and resolution.
#[derive(Debug, Error)]
pub enum FlagError {
    #[error("flag redefined: --{0}")]
    Duplicate(String),

    #[error("flag shorthand -{short} for --{name} is already used by --{existing}")]
    DuplicateShort {
        short: char,
        name: String,
        existing: String,
    },

    #[error("boolean flag --{0} cannot be positional")]
    PositionalBool(String),

    #[error("invalid flag name {0:?}")]
    InvalidName(String),

    #[error("invalid default {value:?} for --{name}: {source}")]
    InvalidDefault {
        name: String,
        value: String,
        #[source]
        source: CoerceError,
    },

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: --{0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for --{name} (from {origin}): {source}")]
    InvalidValue {
        name: String,
        value: String,
        origin: Source,
        #[source]
        source: CoerceError,
    },

    #[error("invalid value for {name}: {message}")]
    Validation { name: String, message: String },

    #[error("required flag not set: --{0}")]
    MissingRequired(String),
}

impl FlagError {
    /// True for errors caused by what the user typed (as opposed to how
    /// the application declared its flags).
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            FlagError::UnknownFlag(_)
                | FlagError::MissingValue(_)
                | FlagError::InvalidValue { .. }
                | FlagError::Validation { .. }
                | FlagError::MissingRequired(_)
        )
    }
}

/// A named, optionally short-aliased, typed setting.
#[derive(Clone)]
pub struct Flag {
    name: String,
    short: Option<char>,
    kind: FlagKind,
    default: String,
    env_var: Option<String>,
    usage: String,
    positional: bool,
    required: bool,
    hidden: bool,
    validate: Option<Validator>,
}

impl Flag {
    /// Create a flag of the given kind.
    pub fn new(name: impl Into<String>, kind: FlagKind) -> Self {
        Self {
            name: name.into(),
            short: None,
            kind,
            default: String::new(),
            env_var: None,
            usage: String::new(),
            positional: false,
            required: false,
            hidden: false,
            validate: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::String)
    }

    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Bool)
    }

    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Int)
    }

    pub fn int64(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Int64)
    }

    pub fn float64(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Float64)
    }

    pub fn duration(name: impl Into<String>) -> Self {
        Self::new(name, FlagKind::Duration)
    }

    /// Single-character alias, used as `-c`.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Default value in string form. Empty means "no default".
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    /// Explicit environment variable, consulted before the derived one.
    pub fn env(mut self, var: impl Into<String>) -> Self {
        self.env_var = Some(var.into());
        self
    }

    pub fn usage(mut self, text: impl Into<String>) -> Self {
        self.usage = text.into();
        self
    }

    /// Bind from bare tokens in registration order.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Leave the flag out of help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Attach a check that runs on the raw value once it has coerced.
    pub fn validate<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_alias(&self) -> Option<char> {
        self.short
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_bool(&self) -> bool {
        self.kind == FlagKind::Bool
    }

    /// Coerce and validate a raw value for this flag.
    ///
    /// `origin` is only used to label the error.
    pub fn accept(&self, raw: &str, origin: Source) -> Result<FlagValue, FlagError> {
        let value = coerce(self.kind, raw).map_err(|source| FlagError::InvalidValue {
            name: self.name.clone(),
            value: raw.to_string(),
            origin,
            source,
        })?;
        if let Some(check) = &self.validate {
            check(raw).map_err(|message| FlagError::Validation {
                name: format!("--{}", self.name),
                message,
            })?;
        }
        Ok(value)
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("short", &self.short)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("env_var", &self.env_var)
            .field("positional", &self.positional)
            .field("required", &self.required)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

/// An ordered registry of flags owned by one command.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
    by_name: HashMap<String, usize>,
    by_short: HashMap<char, usize>,
    positionals: Vec<usize>,
    strict: bool,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown flag tokens become errors instead of positionals.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Add a flag to the registry.
    ///
    /// # Errors
    ///
    /// - `Duplicate` / `DuplicateShort` when the name or alias is taken
    /// - `PositionalBool` for a positional boolean
    /// - `InvalidDefault` when the default does not coerce
    /// - `InvalidName` for empty or dash-prefixed names
    pub fn register(&mut self, flag: Flag) -> Result<(), FlagError> {
        if flag.name.is_empty() || flag.name.starts_with('-') || flag.name.contains('=') {
            return Err(FlagError::InvalidName(flag.name));
        }
        if flag.positional && flag.is_bool() {
            return Err(FlagError::PositionalBool(flag.name));
        }
        if self.by_name.contains_key(&flag.name) {
            return Err(FlagError::Duplicate(flag.name));
        }
        if let Some(short) = flag.short {
            if let Some(&existing) = self.by_short.get(&short) {
                return Err(FlagError::DuplicateShort {
                    short,
                    name: flag.name,
                    existing: self.flags[existing].name.clone(),
                });
            }
        }
        if !flag.default.is_empty() {
            if let Err(source) = coerce(flag.kind, &flag.default) {
                return Err(FlagError::InvalidDefault {
                    name: flag.name,
                    value: flag.default,
                    source,
                });
            }
        }

        let index = self.flags.len();
        self.by_name.insert(flag.name.clone(), index);
        if let Some(short) = flag.short {
            self.by_short.insert(short, index);
        }
        if flag.positional {
            self.positionals.push(index);
        }
        self.flags.push(flag);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.by_name.get(name).map(|&i| &self.flags[i])
    }

    pub fn lookup_short(&self, short: char) -> Option<&Flag> {
        self.by_short.get(&short).map(|&i| &self.flags[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn has_short(&self, short: char) -> bool {
        self.by_short.contains_key(&short)
    }

    /// Flags in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Flag> {
        self.flags.iter()
    }

    /// Positional flags in registration order.
    pub fn positionals(&self) -> impl Iterator<Item = &Flag> {
        self.positionals.iter().map(|&i| &self.flags[i])
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Fail on the first required flag that no source supplied.
    pub fn check_required(&self, scope: Scope, resolved: &ResolvedFlags) -> Result<(), FlagError> {
        match self
            .flags
            .iter()
            .find(|f| f.required && resolved.get(scope, &f.name).is_none())
        {
            Some(flag) => Err(FlagError::MissingRequired(flag.name.clone())),
            None => Ok(()),
        }
    }
}
