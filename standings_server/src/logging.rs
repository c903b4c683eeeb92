//! Structured logging setup and helpers.
//!
//! The library logs through the `log` facade; those records are bridged into
//! the tracing subscriber installed here.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,hyper=warn";

/// Operations slower than this are logged at `warn`
pub const SLOW_OPERATION_MS: u64 = 500;

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use standings_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // `init` also installs the `log` -> `tracing` bridge.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log how long an operation took, escalating slow ones to `warn`
///
/// # Example
///
/// ```
/// use standings_server::logging::log_performance;
/// use std::time::Instant;
///
/// let start = Instant::now();
/// // ... compute standings ...
/// log_performance("standings_compute", start.elapsed().as_millis() as u64, Some("regular_season"));
/// ```
pub fn log_performance(operation: &str, duration_ms: u64, scope: Option<&str>) {
    if duration_ms > SLOW_OPERATION_MS {
        tracing::warn!(
            operation = operation,
            duration_ms = duration_ms,
            scope = scope,
            "Slow operation"
        );
    } else {
        tracing::debug!(
            operation = operation,
            duration_ms = duration_ms,
            scope = scope,
            "Operation timing"
        );
    }
}

/// Log an admin action against the standings engine
pub fn log_admin_action(action: &str, request_id: &str, detail: &str) {
    tracing::info!(
        action = action,
        request_id = request_id,
        "ADMIN: {}",
        detail
    );
}

/// Log a rejected admin credential
pub fn log_rejected_admin(path: &str, request_id: &str, reason: &str) {
    tracing::warn!(
        path = path,
        request_id = request_id,
        "SECURITY: admin request rejected: {}",
        reason
    );
}
