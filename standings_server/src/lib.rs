//! HTTP server for the competition standings engine.
//!
//! - [`api`]: axum router, handlers and middleware
//! - [`config`]: environment-driven configuration
//! - [`logging`]: tracing setup and log helpers
//! - [`metrics`]: Prometheus metrics
//! - [`seed`]: seed data for the in-memory store

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod seed;
