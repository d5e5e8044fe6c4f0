//! Shared logging utilities for consistent tracing across launcher and workers

use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Build the filter directive used by the launcher binary and its library crates
pub fn filter_directive(log_level: Option<&str>) -> String {
    let base_level = log_level.unwrap_or("info");
    format!("launcher={base_level},shared={base_level},reqwest=warn,hyper=warn")
}

/// Initialize the stdout tracing subscriber with an optional log level
pub fn init_tracing_with_level(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = filter_directive(log_level);

    fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Initialize tracing at the default level
pub fn init_tracing() {
    init_tracing_with_level(None);
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for worker-aware info logging
#[macro_export]
macro_rules! worker_info {
    ($worker:expr, $($arg:tt)*) => {
        tracing::info!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for worker-aware warning logging
#[macro_export]
macro_rules! worker_warn {
    ($worker:expr, $($arg:tt)*) => {
        tracing::warn!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for worker-aware error logging
#[macro_export]
macro_rules! worker_error {
    ($worker:expr, $($arg:tt)*) => {
        tracing::error!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for worker-aware debug logging
#[macro_export]
macro_rules! worker_debug {
    ($worker:expr, $($arg:tt)*) => {
        tracing::debug!(
            worker = %$worker,
            timestamp = $crate::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(worker: &str, details: &str) {
    info!(
        worker = %worker,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(worker: &str, reason: &str) {
    info!(
        worker = %worker,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(worker: &str, context: &str, error: &dyn std::fmt::Display) {
    error!(
        worker = %worker,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(worker: &str, message: &str) {
    info!(
        worker = %worker,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
