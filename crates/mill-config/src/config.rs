//! Configuration system for safe delete.
//!
//! # Configuration Hierarchy
//!
//! Settings are resolved in the following order of precedence (highest to lowest):
//! 1. **Environment Variables**: `TYPEMILL_SAFE_DELETE_*` (e.g., `TYPEMILL_SAFE_DELETE_EXECUTION__MODE=headless`)
//! 2. **Local Configuration**: `.typemill/safe-delete.toml` in the workspace root.
//! 3. **Default Values**: Hardcoded defaults in the configuration structs.
//!
//! # Configuration File Example
//!
//! ```toml
//! # .typemill/safe-delete.toml
//! [execution]
//! mode = "headless"
//! dry_run = true
//!
//! [search]
//! channel_capacity = 64
//! include_non_code_usages = true
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use mill_foundation::MillError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const CONFIG_DIR: &str = ".typemill";
const CONFIG_FILE: &str = "safe-delete.toml";
const ENV_PREFIX: &str = "TYPEMILL_SAFE_DELETE_";

/// Root configuration for safe delete
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SafeDeleteConfig {
    pub execution: ExecutionConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// How conflicts are surfaced
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Conflicts are shown in a dialog and the deletion is abandoned
    #[default]
    Interactive,
    /// Conflicts fail the deletion with `MillError::Conflicts`
    Headless,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    pub mode: ExecutionMode,
    /// Headless only: apply the safe edits even when conflicts exist.
    /// Meant for automated test harnesses.
    pub ignore_conflicts: bool,
    /// Compute the plan without applying it
    pub dry_run: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Capacity of the queue between the search producer and the resolver
    pub channel_capacity: usize,
    pub include_non_code_usages: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            include_non_code_usages: false,
        }
    }
}

impl SearchConfig {
    /// Queue capacity, never zero
    pub fn effective_capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format for development
    #[default]
    Pretty,
    /// Structured JSON format for production
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl SafeDeleteConfig {
    /// Loads configuration from defaults, the workspace file and the environment.
    ///
    /// A missing `.typemill/safe-delete.toml` is not an error.
    pub fn load(workspace_root: &Path) -> Result<Self, ConfigError> {
        let config_path = workspace_root.join(CONFIG_DIR).join(CONFIG_FILE);
        Self::figment(&config_path).extract().map_err(ConfigError::from)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(SafeDeleteConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Parse configuration from TOML text on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(SafeDeleteConfig::default()))
            .merge(Toml::string(content))
            .extract()
            .map_err(ConfigError::from)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Figment error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Figment(Box::new(err))
    }
}

impl From<ConfigError> for MillError {
    fn from(err: ConfigError) -> Self {
        MillError::config(err.to_string())
    }
}
