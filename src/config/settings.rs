//! TOML-based configuration for relfold.
//!
//! Supports a config file (relfold.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [sql]
//! dialect = "${RELFOLD_DIALECT}"
//!
//! [query]
//! require_affected_rows = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::dialect::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// SQL generation settings.
    pub sql: SqlSettings,

    /// Query execution settings.
    pub query: QuerySettings,
}

/// SQL generation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Dialect name (mysql, postgres, duckdb, tsql). Supports ${ENV_VAR} expansion.
    pub dialect: String,
}

impl Default for SqlSettings {
    fn default() -> Self {
        Self {
            dialect: "mysql".to_string(),
        }
    }
}

/// Query execution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Fail updates and deletes that affect no rows.
    pub require_affected_rows: bool,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            require_affected_rows: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `RELFOLD_CONFIG`
    /// 2. `./relfold.toml`
    /// 3. `~/.config/relfold/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("RELFOLD_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("relfold.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("relfold").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// The configured dialect, with environment variables expanded.
    pub fn dialect(&self) -> Result<Dialect, SettingsError> {
        let name = expand_env_vars(&self.sql.dialect)?;
        Dialect::from_name(&name).ok_or(SettingsError::UnsupportedDialect(name))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
