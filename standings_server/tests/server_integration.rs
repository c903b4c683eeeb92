//! Integration tests for the standings HTTP API.
//!
//! Every test drives the full router with `oneshot` over an in-memory store.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use standings::MatchRecord;
use standings::db::InMemoryStore;
use standings::standings::StandingsManager;
use standings_server::api::{AppState, create_router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // For `oneshot` method

const ADMIN_TOKEN: &str = "integration-admin-token";

fn record(id: &str, stage: &str, home: &str, away: &str, score: (i64, i64)) -> MatchRecord {
    MatchRecord {
        id: id.to_string(),
        stage: stage.to_string(),
        home_team_id: home.to_string(),
        away_team_id: away.to_string(),
        status: "completed".to_string(),
        home_team_score: Some(score.0),
        away_team_score: Some(score.1),
        ..Default::default()
    }
}

fn final_record(id: &str, home: &str, away: &str, score: (i64, i64), is_test: bool) -> MatchRecord {
    MatchRecord {
        is_published: Some(false),
        is_test: Some(is_test),
        ..record(id, "final", home, away, score)
    }
}

fn seeded_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_team("a", "Alpha")
        .with_team("b", "Bravo")
        .with_team("c", "Charlie")
        .with_record(record("m1", "regular_season", "a", "b", (2, 1)))
        .with_record(record("m2", "regular_season", "b", "c", (0, 0)))
        .with_record(MatchRecord {
            group_key: Some("Group A".to_string()),
            ..record("g1", "mini_league", "a", "c", (0, 3))
        })
        .with_record(final_record("f1", "a", "c", (1, 0), false))
        .with_record(final_record("t1", "b", "c", (4, 4), true))
}

/// Helper to create a test server over an in-memory store
fn create_test_server(store: InMemoryStore) -> (axum::Router, Arc<InMemoryStore>) {
    let store = Arc::new(store);
    let manager = Arc::new(StandingsManager::new(
        store.clone(),
        store.clone(),
        Duration::from_secs(30),
    ));

    (create_router(AppState::new(manager, ADMIN_TOKEN)), store)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap()
}

fn publish_request(token: Option<&str>, is_test: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/publish-finals")
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    builder
        .body(Body::from(serde_json::json!({ "isTest": is_test }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn team_ids(body: &Value) -> Vec<String> {
    body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["teamId"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let (app, _) = create_test_server(seeded_store());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], true);
    assert_eq!(body["cacheTtlSecs"], 30);
}

#[tokio::test]
async fn test_health_check_reports_unavailable_store() {
    let (app, store) = create_test_server(seeded_store());
    store.set_unavailable(true);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(response).await["status"], "unhealthy");
}

// ============================================================================
// Standings Query Tests
// ============================================================================

#[tokio::test]
async fn test_regular_season_standings() {
    let (app, _) = create_test_server(seeded_store());

    let response = app
        .oneshot(get("/api/v1/standings?stage=regular"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-cache-age").unwrap(), "0");

    let body = json_body(response).await;
    assert_eq!(body["stage"], "regular_season");
    assert_eq!(body["cached"], false);
    // Charlie edges Bravo on goal difference
    assert_eq!(team_ids(&body), vec!["a", "c", "b"]);

    let leader = &body["rows"][0];
    assert_eq!(leader["position"], 1);
    assert_eq!(leader["teamName"], "Alpha");
    assert_eq!(leader["points"], 3);
    assert_eq!(leader["goalDifference"], 1);

    let bravo = &body["rows"][2];
    assert_eq!(bravo["played"], 2);
    assert_eq!(bravo["points"], 1);
    assert_eq!(bravo["goalDifference"], -1);
}

#[tokio::test]
async fn test_second_query_is_served_from_cache() {
    let (app, store) = create_test_server(seeded_store());

    let first = app
        .clone()
        .oneshot(get("/api/v1/standings?stage=regular"))
        .await
        .unwrap();
    assert_eq!(json_body(first).await["cached"], false);

    let second = app
        .oneshot(get("/api/v1/standings?stage=regular"))
        .await
        .unwrap();
    assert_eq!(json_body(second).await["cached"], true);
    assert_eq!(store.read_count(), 1);
}

#[tokio::test]
async fn test_mini_league_group_scope() {
    let (app, _) = create_test_server(seeded_store());

    let response = app
        .oneshot(get("/api/v1/standings?stage=mini_league&group=Group%20A"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["group"], "Group A");
    assert_eq!(team_ids(&body), vec!["c", "a"]);
}

#[tokio::test]
async fn test_missing_stage_is_bad_request() {
    let (app, _) = create_test_server(seeded_store());

    let response = app.oneshot(get("/api/v1/standings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_mini_league_without_group_is_bad_request() {
    let (app, store) = create_test_server(seeded_store());

    let response = app
        .oneshot(get("/api/v1/standings?stage=mini_league"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.read_count(), 0);
}

#[tokio::test]
async fn test_unknown_stage_is_bad_request() {
    let (app, _) = create_test_server(seeded_store());

    let response = app
        .oneshot(get("/api/v1/standings?stage=playoffs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unavailable_store_is_service_unavailable() {
    let (app, store) = create_test_server(seeded_store());
    store.set_unavailable(true);

    let response = app
        .oneshot(get("/api/v1/standings?stage=regular"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Finals Visibility Tests
// ============================================================================

#[tokio::test]
async fn test_public_finals_hide_unpublished_results() {
    let (app, _) = create_test_server(seeded_store());

    let response = app
        .oneshot(get("/api/v1/standings?stage=final"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unpublished_finals_require_admin_token() {
    let (app, _) = create_test_server(seeded_store());

    let response = app
        .oneshot(get("/api/v1/standings?stage=final&includeUnpublishedFinals=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_sees_unpublished_finals() {
    let (app, _) = create_test_server(seeded_store());

    let response = app
        .oneshot(admin_get(
            "/api/v1/standings?stage=final&includeUnpublishedFinals=true",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(team_ids(&body).contains(&"a".to_string()));
}

// ============================================================================
// Publication Tests
// ============================================================================

#[tokio::test]
async fn test_publish_requires_admin_token() {
    let (app, _) = create_test_server(seeded_store());

    let missing = app.clone().oneshot(publish_request(None, false)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .oneshot(publish_request(Some("not-the-admin-token"), false))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_publish_finals_then_public_table_shows_them() {
    let (app, _) = create_test_server(seeded_store());

    // Warm the cache with the empty public table
    let before = app
        .clone()
        .oneshot(get("/api/v1/standings?stage=final"))
        .await
        .unwrap();
    assert!(json_body(before).await["rows"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(publish_request(Some(ADMIN_TOKEN), false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["publishedCount"], 1);
    assert_eq!(body["publishedMatchIds"], serde_json::json!(["f1"]));

    let after = app
        .oneshot(get("/api/v1/standings?stage=final"))
        .await
        .unwrap();
    let after = json_body(after).await;
    assert_eq!(after["cached"], false);
    assert_eq!(team_ids(&after), vec!["a", "c"]);
}

#[tokio::test]
async fn test_publish_is_idempotent() {
    let (app, _) = create_test_server(seeded_store());

    let first = app
        .clone()
        .oneshot(publish_request(Some(ADMIN_TOKEN), false))
        .await
        .unwrap();
    assert_eq!(json_body(first).await["publishedCount"], 1);

    let second = app
        .oneshot(publish_request(Some(ADMIN_TOKEN), false))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await["publishedCount"], 0);
}

#[tokio::test]
async fn test_rehearsal_publish_leaves_live_finals_untouched() {
    let (app, store) = create_test_server(seeded_store());

    let response = app
        .oneshot(publish_request(Some(ADMIN_TOKEN), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["publishedMatchIds"], serde_json::json!(["t1"]));

    let records = store.records().await;
    let live = records.iter().find(|r| r.id == "f1").unwrap();
    assert_eq!(live.is_published, Some(false));
}

#[tokio::test]
async fn test_publish_without_finals_is_bad_request() {
    let store = InMemoryStore::new()
        .with_team("a", "Alpha")
        .with_team("b", "Bravo")
        .with_record(record("m1", "regular_season", "a", "b", (1, 0)));
    let (app, _) = create_test_server(store);

    let response = app
        .oneshot(publish_request(Some(ADMIN_TOKEN), false))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Cache Administration Tests
// ============================================================================

#[tokio::test]
async fn test_purge_cache_forces_recompute() {
    let (app, store) = create_test_server(seeded_store());

    app.clone()
        .oneshot(get("/api/v1/standings?stage=regular"))
        .await
        .unwrap();

    let purge = Request::builder()
        .method("POST")
        .uri("/api/v1/admin/cache/purge")
        .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(purge).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["purgedEntries"], 1);

    let again = app
        .oneshot(get("/api/v1/standings?stage=regular"))
        .await
        .unwrap();
    assert_eq!(json_body(again).await["cached"], false);
    assert_eq!(store.read_count(), 2);
}

// ============================================================================
// Middleware Tests
// ============================================================================

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _) = create_test_server(seeded_store());

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-42");
}

#[tokio::test]
async fn test_request_id_is_generated_when_absent() {
    let (app, _) = create_test_server(seeded_store());

    let response = app.oneshot(get("/health")).await.unwrap();
    let id = response.headers().get("x-request-id").unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_404_for_invalid_endpoint() {
    let (app, _) = create_test_server(seeded_store());

    let response = app.oneshot(get("/api/v1/nonexistent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_standings_queries() {
    let (app, _) = create_test_server(seeded_store());

    let mut handles = vec![];
    for _ in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            app.oneshot(get("/api/v1/standings?stage=regular")).await
        }));
    }

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
