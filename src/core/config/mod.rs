//! core::config
//!
//! String key/value configuration store.
//!
//! # Overview
//!
//! Flag resolution consults a [`ConfigStore`] after the environment and
//! before defaults, looking keys up by flag name. Values are plain strings;
//! typed coercion happens in the flag layer.
//!
//! # File Format
//!
//! [`TomlConfigStore`] persists a TOML document. Scalars of any type are read
//! back as strings, and nested tables flatten to dotted keys:
//!
//! ```toml
//! region = "eu-west-1"
//! retries = 3
//!
//! [greet]
//! greeting = "hey"    # key: "greet.greeting"
//! ```
//!
//! # Locations
//!
//! [`TomlConfigStore::default_path`] searches, in order:
//! 1. `$XDG_CONFIG_HOME/<app>/config.toml`
//! 2. The platform config directory (`dirs::config_dir`)
//! 3. `~/.<app>/config.toml`
//!
//! # Example
//!
//! ```
//! use trellis::core::config::{ConfigStore, TomlConfigStore};
//!
//! let mut store = TomlConfigStore::new();
//! store.set("region", "eu-west-1");
//! assert_eq!(store.get("region").as_deref(), Some("eu-west-1"));
//! store.reset();
//! assert!(store.get("region").is_none());
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Load {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// A simple string-keyed store consulted during flag resolution.
pub trait ConfigStore {
    /// Value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or replace a value.
    fn set(&mut self, key: &str, value: &str);

    /// Replace the contents with those of the file at `path`.
    fn load(&mut self, path: &Path) -> Result<(), ConfigError>;

    /// Persist the contents to `path`.
    fn save(&self, path: &Path) -> Result<(), ConfigError>;

    /// Remove every value.
    fn reset(&mut self);
}

/// A [`ConfigStore`] persisted as TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TomlConfigStore {
    values: BTreeMap<String, String>,
}

impl TomlConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store and load `path` into it.
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let mut store = Self::new();
        store.load(path)?;
        Ok(store)
    }

    /// The canonical config file location for an application.
    pub fn default_path(app: &str) -> Result<PathBuf, ConfigError> {
        Self::default_path_from(app, std::env::var_os("XDG_CONFIG_HOME"))
    }

    /// [`TomlConfigStore::default_path`] with an explicit `XDG_CONFIG_HOME`.
    fn default_path_from(app: &str, xdg_home: Option<OsString>) -> Result<PathBuf, ConfigError> {
        if let Some(xdg_home) = xdg_home.filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(xdg_home).join(app).join("config.toml"));
        }
        if let Some(dir) = dirs::config_dir() {
            return Ok(dir.join(app).join("config.toml"));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(format!(".{app}")).join("config.toml"))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse TOML text into flat string values.
    fn parse_document(path: &Path, contents: &str) -> Result<BTreeMap<String, String>, ConfigError> {
        let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| {
            ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        let mut values = BTreeMap::new();
        flatten(path, "", &table, &mut values)?;
        Ok(values)
    }
}

fn flatten(
    path: &Path,
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let text = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Datetime(d) => d.to_string(),
            toml::Value::Table(inner) => {
                flatten(path, &key, inner, out)?;
                continue;
            }
            toml::Value::Array(_) => {
                return Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    message: format!("'{key}' is an array; only scalar values are supported"),
                })
            }
        };
        out.insert(key, text);
    }
    Ok(())
}

impl ConfigStore for TomlConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn load(&mut self, path: &Path) -> Result<(), ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.values = Self::parse_document(path, &contents)?;
        debug!(path = %path.display(), keys = self.values.len(), "config loaded");
        Ok(())
    }

    /// Written atomically: temp file in the same directory, fsync, rename.
    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::Save {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let contents = toml::to_string_pretty(&self.values)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::Save {
            path: temp_path.clone(),
            source: e,
        })?;
        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::Save {
                path: temp_path.clone(),
                source: e,
            })?;
        file.sync_all().map_err(|e| ConfigError::Save {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::Save {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}
