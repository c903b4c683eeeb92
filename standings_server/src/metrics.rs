//! Prometheus metrics for the standings server.
//!
//! # Metrics
//!
//! - **HTTP**: request counts and durations
//! - **Standings**: query counts by stage and cache outcome, compute time
//! - **Publication**: finals flipped to published
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use standings_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::standings_queries_total("regular_season", true);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize the Prometheus exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Standings Metrics
// ============================================================================

/// Count a standings query by stage and whether the cache served it.
pub fn standings_queries_total(stage: &str, cache_hit: bool) {
    metrics::counter!("standings_queries_total",
        "stage" => stage.to_string(),
        "cache" => if cache_hit { "hit" } else { "miss" }
    )
    .increment(1);
}

/// Record how long an uncached standings computation took.
pub fn standings_compute_duration_ms(stage: &str, duration_ms: f64) {
    metrics::histogram!("standings_compute_duration_ms",
        "stage" => stage.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Publication Metrics
// ============================================================================

/// Count finals flipped to published.
pub fn finals_published_total(is_test: bool, count: usize) {
    metrics::counter!("finals_published_total",
        "is_test" => is_test.to_string()
    )
    .increment(count as u64);
}
