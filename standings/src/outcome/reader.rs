//! Result ledger reader: projects stored match records into canonical outcomes.
//!
//! Stored documents have carried two naming schemes for scores over time:
//!
//! - current: `homeTeamScore` / `awayTeamScore`
//! - legacy: `homeScore` / `awayScore`
//!
//! All knowledge of those shapes lives here. Records that cannot be projected
//! are dropped with a warning instead of failing the batch.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::models::{
    FinalsPublication, MatchOutcome, MatchStatus, PublicationState, Score, Stage,
};
use crate::db::MatchResultStore;
use crate::errors::StandingsResult;
use crate::standings::router::StandingsScope;

/// Match record as persisted in the match result store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    #[serde(default)]
    pub id: String,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
    pub home_team_id: String,
    pub away_team_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_test: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub played_at: Option<DateTime<Utc>>,
}

/// Resolve one side of the score, preferring the current field name
fn resolve_side(record_id: &str, side: &str, current: Option<i64>, legacy: Option<i64>) -> Option<u32> {
    if let (Some(current), Some(legacy)) = (current, legacy) {
        if current != legacy {
            debug!(
                "Record {}: {} score fields disagree ({} vs legacy {}), using current",
                record_id, side, current, legacy
            );
        }
    }

    current
        .or(legacy)
        .and_then(|value| u32::try_from(value).ok())
}

/// Project a stored record into a canonical outcome.
///
/// Returns `None` (after logging a warning) when the record has an unknown
/// stage or status, identical participants, a mini-league fixture without a
/// group, or a completed fixture without a resolvable non-negative score pair.
pub fn normalize(record: &MatchRecord) -> Option<MatchOutcome> {
    let stage = match record.stage.parse::<Stage>() {
        Ok(stage) => stage,
        Err(_) => {
            warn!("Dropping record {}: unknown stage '{}'", record.id, record.stage);
            return None;
        }
    };

    let Some(status) = MatchStatus::parse(&record.status) else {
        warn!("Dropping record {}: unknown status '{}'", record.id, record.status);
        return None;
    };

    if record.home_team_id == record.away_team_id {
        warn!(
            "Dropping record {}: team {} listed on both sides",
            record.id, record.home_team_id
        );
        return None;
    }

    let group_key = match stage {
        Stage::MiniLeague => match record.group_key.as_deref().map(str::trim) {
            Some(group) if !group.is_empty() => Some(group.to_string()),
            _ => {
                warn!("Dropping record {}: mini-league fixture without a group", record.id);
                return None;
            }
        },
        Stage::RegularSeason | Stage::Final => None,
    };

    let score = if status == MatchStatus::Completed {
        let home = resolve_side(&record.id, "home", record.home_team_score, record.home_score);
        let away = resolve_side(&record.id, "away", record.away_team_score, record.away_score);
        match (home, away) {
            (Some(home), Some(away)) => Some(Score::new(home, away)),
            _ => {
                warn!(
                    "Dropping record {}: completed without a resolvable score pair",
                    record.id
                );
                return None;
            }
        }
    } else {
        None
    };

    let publication = (stage == Stage::Final).then(|| FinalsPublication {
        state: PublicationState::from(record.is_published.unwrap_or(false)),
        is_test: record.is_test.unwrap_or(false),
    });

    Some(MatchOutcome {
        match_id: record.id.clone(),
        stage,
        group_key,
        home_team_id: record.home_team_id.clone(),
        away_team_id: record.away_team_id.clone(),
        score,
        status,
        publication,
        played_at: record.played_at,
    })
}

/// Normalize a batch, dropping unreadable records
pub fn normalize_all(records: &[MatchRecord]) -> Vec<MatchOutcome> {
    let outcomes: Vec<MatchOutcome> = records.iter().filter_map(normalize).collect();

    if outcomes.len() < records.len() {
        warn!(
            "Dropped {} of {} stored match records during normalization",
            records.len() - outcomes.len(),
            records.len()
        );
    }

    outcomes
}

/// Read-only projection over the match result store
#[derive(Clone)]
pub struct ResultLedgerReader {
    store: Arc<dyn MatchResultStore>,
}

impl ResultLedgerReader {
    /// Create a new reader over a match result store
    pub fn new(store: Arc<dyn MatchResultStore>) -> Self {
        Self { store }
    }

    /// Load outcomes for a stage (and group, for mini-leagues).
    ///
    /// Finals are returned regardless of publication state.
    ///
    /// # Errors
    ///
    /// * `StandingsError::InvalidQuery` - group key missing for a mini-league, or given for another stage
    /// * `StandingsError::DependencyUnavailable` - the store failed
    pub async fn load_outcomes(
        &self,
        stage: Stage,
        group_key: Option<&str>,
    ) -> StandingsResult<Vec<MatchOutcome>> {
        let scope = StandingsScope::new(stage, group_key.map(str::to_string))?;
        self.load_scope(&scope).await
    }

    /// Load outcomes for an already validated scope
    pub async fn load_scope(&self, scope: &StandingsScope) -> StandingsResult<Vec<MatchOutcome>> {
        let records = self
            .store
            .list_completed_records(scope.stage, scope.group_key.as_deref())
            .await?;

        let outcomes = normalize_all(&records)
            .into_iter()
            // The store filters by scope; keep the projection honest if it doesn't.
            .filter(|outcome| {
                outcome.stage == scope.stage && outcome.group_key == scope.group_key
            })
            .collect();

        Ok(outcomes)
    }

    /// Load every completed finals outcome with the given rehearsal flag
    pub async fn load_finals(&self, is_test: bool) -> StandingsResult<Vec<MatchOutcome>> {
        let records = self.store.list_final_records(is_test).await?;

        Ok(normalize_all(&records)
            .into_iter()
            .filter(|outcome| {
                outcome.is_final()
                    && outcome.status == MatchStatus::Completed
                    && outcome.is_test() == is_test
            })
            .collect())
    }
}
