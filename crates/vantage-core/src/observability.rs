//! Observability infrastructure for Vantage.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors used across all components.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `vantage_api=debug`)
///
/// # Example
///
/// ```rust
/// use vantage_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for resource operations with standard fields.
///
/// # Example
///
/// ```rust
/// use vantage_core::observability::resource_span;
///
/// let span = resource_span("fetch_dashboard", "dashboard", "jbloggs");
/// let _guard = span.enter();
/// // ... do the operation
/// ```
#[must_use]
pub fn resource_span(operation: &str, resource: &str, user: &str) -> Span {
    tracing::info_span!(
        "resource",
        op = operation,
        resource = resource,
        user = user,
    )
}

/// Creates a span for permission evaluation.
#[must_use]
pub fn permission_span(operation: &str, user: &str) -> Span {
    tracing::info_span!("permission", op = operation, user = user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn span_helper_creates_span() {
        let span = resource_span("fetch", "dashboard", "test-user");
        let _guard = span.enter();
        tracing::info!("message in span");
    }
}
