//! Error handling for the safe delete engine and its collaborators

use std::path::PathBuf;
use thiserror::Error;

/// Core error type used throughout safe delete
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MillError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Operation not supported: {operation}")]
    NotSupported { operation: String },

    /// A target-kind capability failed while answering the engine
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// Query construction, execution or result resolution failed
    #[error("Search error: {message}")]
    Search { message: String },

    /// The deletion is blocked; carries every conflict message
    #[error("Safe delete has {} conflict(s): {}", messages.len(), messages.join("; "))]
    Conflicts { messages: Vec<String> },

    #[error("Operation cancelled")]
    Cancelled,

    /// The document store could not commit the transaction
    #[error("Transaction failed: {message}")]
    Transaction { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Result type alias for convenience
pub type MillResult<T> = Result<T, MillError>;

impl MillError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::Io {
            message: format!("{}: {}", path.display(), source),
            path: Some(path),
            source: Some(source),
        }
    }

    /// Create a new not found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a new not supported error
    pub fn not_supported(operation: impl Into<String>) -> Self {
        Self::NotSupported {
            operation: operation.into(),
        }
    }

    /// Create a new plugin error
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create a new search error
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a new conflicts error
    pub fn conflicts(messages: Vec<String>) -> Self {
        Self::Conflicts { messages }
    }

    /// Create a new transaction error
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the error category for structured logging
    pub fn category(&self) -> &'static str {
        match self {
            MillError::Config { .. } => "config_error",
            MillError::Io { .. } => "io_error",
            MillError::NotFound { .. } => "not_found",
            MillError::NotSupported { .. } => "unsupported_operation",
            MillError::Plugin { .. } => "plugin_error",
            MillError::Search { .. } => "search_error",
            MillError::Conflicts { .. } => "conflicts",
            MillError::Cancelled => "cancelled",
            MillError::Transaction { .. } => "transaction_error",
            MillError::Internal { .. } => "internal_error",
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MillError::Cancelled)
    }

    /// Conflict messages carried by a `Conflicts` error
    pub fn conflict_messages(&self) -> Option<&[String]> {
        match self {
            MillError::Conflicts { messages } => Some(messages),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MillError {
    fn from(err: std::io::Error) -> Self {
        MillError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for MillError {
    fn from(err: serde_json::Error) -> Self {
        MillError::Internal {
            message: format!("JSON error: {}", err),
        }
    }
}
