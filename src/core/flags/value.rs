//! core::flags::value
//!
//! Flag kinds and value coercion.
//!
//! # Design
//!
//! A flag's kind is a closed set. Every raw string that reaches a flag,
//! whatever its source, goes through [`coerce`], and every typed value can be
//! rendered back with [`FlagValue::format`]. The two are inverses:
//! `coerce(kind, &value.format()) == value` for every finite value.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use trellis::core::flags::value::{coerce, FlagKind, FlagValue};
//!
//! let v = coerce(FlagKind::Duration, "1h30m").unwrap();
//! assert_eq!(v, FlagValue::Duration(Duration::from_secs(90 * 60)));
//! assert_eq!(coerce(FlagKind::Bool, "T").unwrap(), FlagValue::Bool(true));
//! ```

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// The value type a flag accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    String,
    Bool,
    Int,
    Int64,
    Float64,
    Duration,
}

impl FlagKind {
    /// Short type name used in usage lines.
    pub fn type_name(self) -> &'static str {
        match self {
            FlagKind::String => "string",
            FlagKind::Bool => "bool",
            FlagKind::Int => "int",
            FlagKind::Int64 => "int64",
            FlagKind::Float64 => "float64",
            FlagKind::Duration => "duration",
        }
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A coerced flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    String(String),
    Bool(bool),
    Int(i32),
    Int64(i64),
    Float64(f64),
    Duration(Duration),
}

impl FlagValue {
    /// The kind this value belongs to.
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::String(_) => FlagKind::String,
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::Int(_) => FlagKind::Int,
            FlagValue::Int64(_) => FlagKind::Int64,
            FlagValue::Float64(_) => FlagKind::Float64,
            FlagValue::Duration(_) => FlagKind::Duration,
        }
    }

    /// Render the value in the string form [`coerce`] accepts.
    pub fn format(&self) -> String {
        match self {
            FlagValue::String(s) => s.clone(),
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::Int(i) => i.to_string(),
            FlagValue::Int64(i) => i.to_string(),
            FlagValue::Float64(f) => f.to_string(),
            FlagValue::Duration(d) if d.is_zero() => "0s".to_string(),
            FlagValue::Duration(d) => humantime::format_duration(*d).to_string(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            FlagValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_int64(&self) -> Option<i64> {
        match self {
            FlagValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FlagValue::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            FlagValue::Duration(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.format())
    }
}

impl Serialize for FlagValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlagValue::String(s) => serializer.serialize_str(s),
            FlagValue::Bool(b) => serializer.serialize_bool(*b),
            FlagValue::Int(i) => serializer.serialize_i32(*i),
            FlagValue::Int64(i) => serializer.serialize_i64(*i),
            FlagValue::Float64(f) => serializer.serialize_f64(*f),
            FlagValue::Duration(_) => serializer.serialize_str(&self.format()),
        }
    }
}

/// Why a raw string could not be coerced to a kind.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoerceError {
    #[error("invalid boolean {0:?}")]
    Bool(String),

    #[error("invalid integer: {0}")]
    Int(#[from] ParseIntError),

    #[error("invalid float: {0}")]
    Float(#[from] ParseFloatError),

    #[error("invalid duration: {0}")]
    Duration(String),
}

/// Parse a boolean the way command-line tools conventionally do.
///
/// Accepts `1`, `t`, `true` and `0`, `f`, `false`, case-insensitively.
pub fn parse_bool(raw: &str) -> Result<bool, CoerceError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Ok(true),
        "0" | "f" | "false" => Ok(false),
        _ => Err(CoerceError::Bool(raw.to_string())),
    }
}

/// Parse a duration such as `90s`, `1h30m`, or `250ms`.
pub fn parse_duration(raw: &str) -> Result<Duration, CoerceError> {
    let trimmed = raw.trim();
    if trimmed == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(trimmed).map_err(|e| CoerceError::Duration(e.to_string()))
}

/// Coerce a raw string into a value of the given kind.
pub fn coerce(kind: FlagKind, raw: &str) -> Result<FlagValue, CoerceError> {
    Ok(match kind {
        FlagKind::String => FlagValue::String(raw.to_string()),
        FlagKind::Bool => FlagValue::Bool(parse_bool(raw)?),
        FlagKind::Int => FlagValue::Int(raw.trim().parse()?),
        FlagKind::Int64 => FlagValue::Int64(raw.trim().parse()?),
        FlagKind::Float64 => FlagValue::Float64(raw.trim().parse()?),
        FlagKind::Duration => FlagValue::Duration(parse_duration(raw)?),
    })
}
