//! Standings query handler.
//!
//! ```bash
//! curl 'http://localhost:6969/api/v1/standings?stage=mini_league&group=Group%20A'
//! ```

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue},
};
use serde::{Deserialize, Serialize};
use standings::standings::{RankedRow, StandingsRequest, StandingsTable};
use std::time::Instant;

use super::middleware::{authorize_admin, reject_admin};
use super::request_id::RequestId;
use super::{ApiError, AppState, ErrorResponse, standings_error};
use crate::{logging, metrics};

/// Response header carrying the table age in seconds
pub const CACHE_AGE_HEADER: &str = "x-cache-age";

/// Query string of `GET /api/v1/standings`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsParams {
    pub stage: Option<String>,
    pub group: Option<String>,
    #[serde(default)]
    pub include_unpublished_finals: bool,
    #[serde(default)]
    pub include_idle_teams: bool,
}

/// One ranked row as served to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRowResponse {
    pub position: usize,
    pub team_id: String,
    pub team_name: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl From<RankedRow> for StandingsRowResponse {
    fn from(ranked: RankedRow) -> Self {
        let goal_difference = ranked.row.goal_difference();
        let row = ranked.row;

        Self {
            position: ranked.position,
            team_id: row.team_id,
            team_name: row.team_name,
            played: row.played,
            wins: row.wins,
            draws: row.draws,
            losses: row.losses,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference,
            points: row.points,
        }
    }
}

/// Ranked table response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub stage: String,
    pub group: Option<String>,
    /// Seconds since the table was computed
    pub age_secs: u64,
    pub cached: bool,
    pub rows: Vec<StandingsRowResponse>,
}

impl From<StandingsTable> for StandingsResponse {
    fn from(table: StandingsTable) -> Self {
        Self {
            stage: table.stage.to_string(),
            group: table.group_key,
            age_secs: table.age_secs,
            cached: table.cached,
            rows: table.rows.into_iter().map(Into::into).collect(),
        }
    }
}

/// Get the ranked standings for a stage.
///
/// # Query Parameters
///
/// - `stage` (required): `regular`, `mini_league` or `final`
/// - `group`: mini-league group, required for `mini_league` and rejected otherwise
/// - `includeUnpublishedFinals`: admin only, include finals not yet published
/// - `includeIdleTeams`: regular season only, list registered teams with no results
///
/// # Errors
///
/// - `400 Bad Request`: malformed scope
/// - `401 Unauthorized`: `includeUnpublishedFinals` without the admin token
/// - `500 Internal Server Error`: invariant broken upstream of aggregation
/// - `503 Service Unavailable`: store or registry unreachable
pub async fn get_standings(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    Query(params): Query<StandingsParams>,
) -> Result<(HeaderMap, Json<StandingsResponse>), ApiError> {
    let Some(stage) = params.stage else {
        return Err((
            axum::http::StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Invalid query: stage is required")),
        ));
    };

    if params.include_unpublished_finals {
        authorize_admin(&state, &headers).map_err(|rejection| {
            reject_admin("/api/v1/standings", Some(&request_id), rejection)
        })?;
    }

    let request = StandingsRequest {
        stage,
        group: params.group,
        include_unpublished_finals: params.include_unpublished_finals,
        include_idle_teams: params.include_idle_teams,
    };

    let started = Instant::now();
    let table = state
        .standings
        .standings(&request)
        .await
        .map_err(|e| standings_error(&e))?;

    let stage_label = table.stage.as_str();
    metrics::standings_queries_total(stage_label, table.cached);

    if !table.cached {
        let elapsed = started.elapsed();
        metrics::standings_compute_duration_ms(stage_label, elapsed.as_secs_f64() * 1000.0);
        logging::log_performance(
            "standings_compute",
            elapsed.as_millis() as u64,
            Some(stage_label),
        );
    }

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        HeaderName::from_static(CACHE_AGE_HEADER),
        HeaderValue::from(table.age_secs),
    );

    Ok((response_headers, Json(table.into())))
}
