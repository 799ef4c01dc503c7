//! # Structured Logging Module
//!
//! Console logging for containerized deployment using the tracing ecosystem.
//!
//! - `RUST_LOG` overrides the level filter when set
//! - otherwise `debug` when the `DEBUG` setting is on, `info` in all other cases
//! - `LOG_FORMAT=json` emits one JSON object per line for log shippers

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging once per process
pub fn init_structured_logging(debug_mode: bool) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_log_level(debug_mode)));
        let json = log_format_is_json(std::env::var("LOG_FORMAT").ok().as_deref());

        let console = if json {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(std::io::IsTerminal::is_terminal(&std::io::stdout()))
                .with_filter(filter)
                .boxed()
        };

        // A subscriber may already be installed by a test harness
        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing");
        }

        tracing::info!(json, debug = debug_mode, "Structured logging initialized");
    });
}

fn default_log_level(debug_mode: bool) -> &'static str {
    if debug_mode {
        "debug"
    } else {
        "info"
    }
}

fn log_format_is_json(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("json"))
}

/// Log structured data for database operations
pub fn log_database_operation(
    operation: &str,
    table: Option<&str>,
    record_id: Option<i64>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        table = table,
        record_id = record_id,
        status = %status,
        details = details,
        "DATABASE_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        "ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(default_log_level(true), "debug");
        assert_eq!(default_log_level(false), "info");
    }

    #[test]
    fn test_log_format_detection() {
        assert!(log_format_is_json(Some("json")));
        assert!(log_format_is_json(Some("JSON")));
        assert!(!log_format_is_json(Some("pretty")));
        assert!(!log_format_is_json(None));
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging(false);
        init_structured_logging(true);
    }
}
