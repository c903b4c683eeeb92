//! Collaborator traits for the standings engine and their PostgreSQL implementations.
//!
//! The engine only ever reads match records and team names. The single write
//! it performs is flipping a final from unpublished to published.

use async_trait::async_trait;
use log::{debug, warn};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;

use super::timeouts::{PUBLISH_TIMEOUT, with_default_timeout, with_timeout};
use crate::errors::StandingsResult;
use crate::outcome::{MatchRecord, Stage, TeamId};

/// Read access to stored match records plus the finals publication write
#[async_trait]
pub trait MatchResultStore: Send + Sync {
    /// Completed records for a stage, restricted to a group when one is given
    async fn list_completed_records(
        &self,
        stage: Stage,
        group_key: Option<&str>,
    ) -> StandingsResult<Vec<MatchRecord>>;

    /// Completed finals records with the given rehearsal flag, any publication state
    async fn list_final_records(&self, is_test: bool) -> StandingsResult<Vec<MatchRecord>>;

    /// Flip one final to published.
    ///
    /// Returns `false` when the record was already published or is not a final.
    async fn mark_published(&self, match_id: &str) -> StandingsResult<bool>;

    /// Check the store is reachable
    async fn health_check(&self) -> StandingsResult<()>;
}

/// Team display names
#[async_trait]
pub trait TeamRegistry: Send + Sync {
    /// Display name for one team, `None` if unknown
    async fn team_name(&self, team_id: &str) -> StandingsResult<Option<String>>;

    /// Every registered team id
    async fn list_team_ids(&self) -> StandingsResult<Vec<TeamId>>;

    /// Display names for a batch of teams; unknown ids are absent from the map
    async fn team_names(&self, team_ids: &[TeamId]) -> StandingsResult<HashMap<TeamId, String>> {
        let mut names = HashMap::with_capacity(team_ids.len());
        for team_id in team_ids {
            if let Some(name) = self.team_name(team_id).await? {
                names.insert(team_id.clone(), name);
            }
        }
        Ok(names)
    }
}

/// Rebuild a record from a `match_records` row.
///
/// The `id` column fills in a missing document id. Documents that do not
/// have the record shape are skipped with a warning.
fn record_from_row(row: &sqlx::postgres::PgRow) -> StandingsResult<Option<MatchRecord>> {
    let id: String = row.try_get("id")?;
    let Json(document): Json<serde_json::Value> = row.try_get("document")?;

    match serde_json::from_value::<MatchRecord>(document) {
        Ok(mut record) => {
            if record.id.is_empty() {
                record.id = id;
            }
            Ok(Some(record))
        }
        Err(e) => {
            warn!("Skipping match record {}: unreadable document: {}", id, e);
            Ok(None)
        }
    }
}

fn records_from_rows(rows: &[sqlx::postgres::PgRow]) -> StandingsResult<Vec<MatchRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if let Some(record) = record_from_row(row)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Completed records of a stage. Stored group keys are compared trimmed, the
/// same way the reader normalizes them.
const LIST_COMPLETED_SQL: &str = "SELECT id, document FROM match_records
     WHERE stage = $1
       AND LOWER(status) = 'completed'
       AND ($2::TEXT IS NULL OR TRIM(group_key) = $2)
     ORDER BY id";

/// PostgreSQL implementation of `MatchResultStore`
///
/// Records live in `match_records` as JSONB documents, with the stage, group,
/// status and publication flags mirrored into columns for filtering.
pub struct PgMatchResultStore {
    pool: PgPool,
}

impl PgMatchResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchResultStore for PgMatchResultStore {
    async fn list_completed_records(
        &self,
        stage: Stage,
        group_key: Option<&str>,
    ) -> StandingsResult<Vec<MatchRecord>> {
        let rows = with_default_timeout(
            sqlx::query(LIST_COMPLETED_SQL)
            .bind(stage.as_str())
            .bind(group_key)
            .fetch_all(&self.pool),
        )
        .await?;

        debug!("Loaded {} {} records", rows.len(), stage);

        records_from_rows(&rows)
    }

    async fn list_final_records(&self, is_test: bool) -> StandingsResult<Vec<MatchRecord>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT id, document FROM match_records
                 WHERE stage = 'final'
                   AND LOWER(status) = 'completed'
                   AND is_test = $1
                 ORDER BY id",
            )
            .bind(is_test)
            .fetch_all(&self.pool),
        )
        .await?;

        records_from_rows(&rows)
    }

    async fn mark_published(&self, match_id: &str) -> StandingsResult<bool> {
        // Conditional update: concurrent publishers cannot flip the same final twice.
        let result = with_timeout(
            PUBLISH_TIMEOUT,
            sqlx::query(
                "UPDATE match_records
                 SET is_published = TRUE,
                     document = jsonb_set(document, '{isPublished}', 'true'::jsonb),
                     published_at = NOW()
                 WHERE id = $1 AND stage = 'final' AND is_published = FALSE",
            )
            .bind(match_id)
            .execute(&self.pool),
        )
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn health_check(&self) -> StandingsResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }
}

/// PostgreSQL implementation of `TeamRegistry` over the `teams` table
pub struct PgTeamRegistry {
    pool: PgPool,
}

impl PgTeamRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TeamRegistry for PgTeamRegistry {
    async fn team_name(&self, team_id: &str) -> StandingsResult<Option<String>> {
        let row = with_default_timeout(
            sqlx::query("SELECT name FROM teams WHERE id = $1")
                .bind(team_id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| r.try_get::<String, _>("name")).transpose()?)
    }

    async fn list_team_ids(&self) -> StandingsResult<Vec<TeamId>> {
        let rows = with_default_timeout(
            sqlx::query("SELECT id FROM teams ORDER BY id").fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .iter()
            .map(|r| r.try_get::<String, _>("id"))
            .collect::<Result<_, _>>()?)
    }

    async fn team_names(&self, team_ids: &[TeamId]) -> StandingsResult<HashMap<TeamId, String>> {
        if team_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = with_default_timeout(
            sqlx::query("SELECT id, name FROM teams WHERE id = ANY($1)")
                .bind(team_ids)
                .fetch_all(&self.pool),
        )
        .await?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in &rows {
            names.insert(
                row.try_get::<String, _>("id")?,
                row.try_get::<String, _>("name")?,
            );
        }
        Ok(names)
    }
}
