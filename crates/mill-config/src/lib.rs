//! Configuration and logging setup for safe delete

pub mod config;
pub mod logging;

pub use config::{
    ConfigError, ExecutionConfig, ExecutionMode, LogFormat, LoggingConfig, SafeDeleteConfig,
    SearchConfig,
};
