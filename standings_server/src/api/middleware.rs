//! Admin authentication middleware.
//!
//! Admin routes require `Authorization: Bearer <STANDINGS_ADMIN_TOKEN>`.
//! Tokens are compared as SHA-256 digests in constant time.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::post, middleware};
//! # use standings_server::api::middleware::admin_middleware;
//! # use standings_server::api::AppState;
//! # async fn handler() {}
//! # let state: AppState = unimplemented!();
//!
//! let admin_routes: Router<AppState> = Router::new()
//!     .route("/admin/cache/purge", post(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), admin_middleware));
//! # let _ = admin_routes;
//! ```

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use super::request_id::RequestId;
use super::{ApiError, AppState, ErrorResponse, token_digest};
use crate::logging;

/// Why an admin credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRejection {
    MissingToken,
    InvalidToken,
}

impl AdminRejection {
    fn reason(&self) -> &'static str {
        match self {
            AdminRejection::MissingToken => "missing bearer token",
            AdminRejection::InvalidToken => "invalid admin token",
        }
    }
}

/// Check the request carries the admin bearer token
pub fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AdminRejection> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AdminRejection::MissingToken)?;

    let presented = token_digest(token);
    let matches: bool = presented
        .as_slice()
        .ct_eq(state.admin_token_digest.as_slice())
        .into();

    if matches {
        Ok(())
    } else {
        Err(AdminRejection::InvalidToken)
    }
}

/// Build the 401 response for a refused admin request, logging the attempt
pub fn reject_admin(path: &str, request_id: Option<&RequestId>, rejection: AdminRejection) -> ApiError {
    logging::log_rejected_admin(
        path,
        request_id.map(RequestId::as_str).unwrap_or("-"),
        rejection.reason(),
    );

    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::new("Admin authorization required")),
    )
}

/// Middleware guarding admin routes.
///
/// - **Success**: token matches → calls next handler
/// - **Missing or malformed header**: `401 Unauthorized`
/// - **Wrong token**: `401 Unauthorized`
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Err(rejection) = authorize_admin(&state, request.headers()) {
        return Err(reject_admin(
            request.uri().path(),
            request.extensions().get::<RequestId>(),
            rejection,
        ));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use standings::db::InMemoryStore;
    use standings::standings::{DEFAULT_CACHE_TTL, StandingsManager};
    use std::sync::Arc;

    const TOKEN: &str = "0123456789abcdef-admin";

    fn state() -> AppState {
        let store = Arc::new(InMemoryStore::new());
        let manager = StandingsManager::new(store.clone(), store, DEFAULT_CACHE_TTL);
        AppState::new(Arc::new(manager), TOKEN)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_valid_token_is_accepted() {
        assert_eq!(authorize_admin(&state(), &headers(&format!("Bearer {TOKEN}"))), Ok(()));
    }

    #[test]
    fn test_missing_or_malformed_header() {
        let state = state();
        assert_eq!(
            authorize_admin(&state, &HeaderMap::new()),
            Err(AdminRejection::MissingToken)
        );
        assert_eq!(
            authorize_admin(&state, &headers(TOKEN)),
            Err(AdminRejection::MissingToken)
        );
        assert_eq!(
            authorize_admin(&state, &headers("Bearer ")),
            Err(AdminRejection::MissingToken)
        );
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        assert_eq!(
            authorize_admin(&state(), &headers("Bearer not-the-token")),
            Err(AdminRejection::InvalidToken)
        );
    }
}
