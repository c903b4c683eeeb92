//! Finals publication and cache administration handlers.
//!
//! Both routes sit behind the admin middleware.
//!
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/admin/publish-finals \
//!   -H "Authorization: Bearer $STANDINGS_ADMIN_TOKEN" \
//!   -H "Content-Type: application/json" \
//!   -d '{"isTest": false}'
//! ```

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use standings::PublishOutcome;

use super::request_id::RequestId;
use super::{ApiError, AppState, ErrorResponse, standings_error};
use crate::{logging, metrics};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFinalsPayload {
    /// Publish rehearsal finals instead of real ones
    #[serde(default)]
    pub is_test: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishFinalsResponse {
    pub is_test: bool,
    pub published_count: usize,
    pub published_match_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeCacheResponse {
    pub purged_entries: usize,
}

/// Publish every completed, unpublished final with the given rehearsal flag.
///
/// # Response
///
/// `200 OK` with the finals flipped by this call; the count is zero when all
/// candidates were already published.
///
/// # Errors
///
/// - `400 Bad Request`: no completed finals exist for the flag
/// - `503 Service Unavailable`: the store failed; finals published before the
///   failure stay published and a retry completes the rest
pub async fn publish_finals(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(payload): Json<PublishFinalsPayload>,
) -> Result<Json<PublishFinalsResponse>, ApiError> {
    let outcome = state
        .standings
        .publish_pending_finals(payload.is_test)
        .await
        .map_err(|e| standings_error(&e))?;

    match outcome {
        PublishOutcome::Published(summary) => {
            metrics::finals_published_total(payload.is_test, summary.published_count);
            logging::log_admin_action(
                "publish_finals",
                request_id.as_str(),
                &format!(
                    "published {} finals (is_test: {})",
                    summary.published_count, payload.is_test
                ),
            );

            Ok(Json(PublishFinalsResponse {
                is_test: payload.is_test,
                published_count: summary.published_count,
                published_match_ids: summary.published_match_ids,
            }))
        }
        PublishOutcome::NothingToPublish => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!(
                "No completed {} finals to publish",
                if payload.is_test { "rehearsal" } else { "live" }
            ))),
        )),
    }
}

/// Drop every cached standings table.
pub async fn purge_cache(
    State(state): State<AppState>,
    request_id: RequestId,
) -> Json<PurgeCacheResponse> {
    let purged_entries = state.standings.purge_cache().await;

    logging::log_admin_action(
        "purge_cache",
        request_id.as_str(),
        &format!("purged {purged_entries} cached tables"),
    );

    Json(PurgeCacheResponse { purged_entries })
}
