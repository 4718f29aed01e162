//! Centralized logging initialization with environment variable support

use crate::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber with environment variable support
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: Standard Rust log filter (takes precedence over all)
/// - `LOG_FORMAT`: Override format (json, pretty)
///
/// Calling this more than once keeps the first subscriber.
///
/// # Examples
///
/// ```bash
/// # Module-specific filtering
/// RUST_LOG=mill_safe_delete=debug cargo test
///
/// # Structured logs for automation
/// LOG_FORMAT=json ./run-safe-delete
/// ```
pub fn initialize(config: &LoggingConfig) {
    let env_filter = build_filter(&config.level, std::env::var("RUST_LOG").ok().as_deref());

    let format = format_override(std::env::var("LOG_FORMAT").ok().as_deref())
        .unwrap_or_else(|| config.format.clone());

    // Always write to stderr so hosts can keep stdout for their own protocol
    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already initialized");
    }
}

/// `RUST_LOG` when set and valid, otherwise the configured level
fn build_filter(level: &str, rust_log: Option<&str>) -> EnvFilter {
    if let Some(filter) = rust_log
        .filter(|value| !value.trim().is_empty())
        .and_then(|value| EnvFilter::try_new(value).ok())
    {
        return filter;
    }

    let level = level.parse().unwrap_or(tracing::Level::INFO);
    EnvFilter::default().add_directive(level.into())
}

fn format_override(value: Option<&str>) -> Option<LogFormat> {
    match value?.to_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" | "human" => Some(LogFormat::Pretty),
        _ => None,
    }
}

/// Create the span that wraps one safe delete invocation
///
/// All logs emitted while the span is entered carry the session id and the
/// root target, so concurrent deletions can be told apart.
pub fn session_span(session_id: &str, root: &str) -> tracing::Span {
    tracing::info_span!(
        "safe_delete",
        session_id = %session_id,
        root = %root
    )
}
