//! HTTP API for the standings server.
//!
//! # Modules
//!
//! - [`standings`]: Ranked standings queries
//! - [`finals`]: Finals publication and cache administration
//! - [`middleware`]: Admin bearer-token check
//! - [`request_id`]: Request correlation, logging and HTTP metrics
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `GET /health` - Store connectivity
//! - `GET /api/v1/standings?stage=&group=` - Ranked table for a scope
//!
//! ## Admin (`Authorization: Bearer <token>`)
//! - `GET /api/v1/standings?...&includeUnpublishedFinals=true` - Table including unpublished finals
//! - `POST /api/v1/admin/publish-finals` - Publish pending finals
//! - `POST /api/v1/admin/cache/purge` - Drop cached tables
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use standings::db::InMemoryStore;
//! use standings::standings::{DEFAULT_CACHE_TTL, StandingsManager};
//! use standings_server::api::{AppState, create_router};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let manager = Arc::new(StandingsManager::new(store.clone(), store, DEFAULT_CACHE_TTL));
//!
//! let app = create_router(AppState::new(manager, "a-long-admin-token"));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. Restrict origins in production.

pub mod finals;
pub mod middleware;
pub mod request_id;
pub mod standings;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use ::standings::StandingsError;
use ::standings::standings::StandingsManager;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; the manager sits behind an `Arc` and the token is
/// kept only as a digest.
#[derive(Clone)]
pub struct AppState {
    pub standings: Arc<StandingsManager>,
    pub admin_token_digest: [u8; 32],
}

impl AppState {
    pub fn new(standings: Arc<StandingsManager>, admin_token: &str) -> Self {
        Self {
            standings,
            admin_token_digest: token_digest(admin_token),
        }
    }
}

/// SHA-256 of a bearer token
pub fn token_digest(token: &str) -> [u8; 32] {
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&Sha256::digest(token.as_bytes()));
    digest
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Error returned by handlers
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map an engine error to its HTTP status and a client-safe message
pub fn standings_error(err: &StandingsError) -> ApiError {
    let status = match err {
        StandingsError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        StandingsError::PreconditionViolated(_) => StatusCode::INTERNAL_SERVER_ERROR,
        StandingsError::DependencyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status.is_server_error() {
        tracing::error!(status = %status, "Standings request failed: {}", err);
    }

    (status, Json(ErrorResponse::new(err.client_message())))
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```text
/// GET  /health                        - Health check (public)
/// GET  /api/v1/standings              - Standings (public; admin for unpublished finals)
/// POST /api/v1/admin/publish-finals   - Publish pending finals (admin)
/// POST /api/v1/admin/cache/purge      - Purge cached tables (admin)
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Create API v1 router with all versioned endpoints.
fn create_v1_router(state: AppState) -> Router<AppState> {
    // Unpublished-finals visibility is checked inside the handler.
    let public_routes = Router::new().route("/standings", get(standings::get_standings));

    let admin_routes = Router::new()
        .route("/admin/publish-finals", post(finals::publish_finals))
        .route("/admin/cache/purge", post(finals::purge_cache))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::admin_middleware,
        ));

    Router::new().merge(public_routes).merge(admin_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the match result store answers, `503` otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","version":"0.1.0","store":true,"timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.standings.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "cacheTtlSecs": state.standings.cache_ttl().as_secs(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (StandingsError::InvalidQuery("x".into()), StatusCode::BAD_REQUEST),
            (
                StandingsError::PreconditionViolated("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StandingsError::DependencyUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(standings_error(&err).0, expected);
        }
    }

    #[test]
    fn test_token_digest_is_stable() {
        assert_eq!(token_digest("secret"), token_digest("secret"));
        assert_ne!(token_digest("secret"), token_digest("Secret"));
    }
}
