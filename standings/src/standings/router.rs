//! Stage routing: validates the query scope and runs the
//! read -> aggregate -> rank pipeline for it.

use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::aggregator::{StandingsRow, aggregate, union_roster};
use super::ranking::rank;
use crate::db::TeamRegistry;
use crate::errors::{StandingsError, StandingsResult};
use crate::outcome::{MatchOutcome, MatchStatus, ResultLedgerReader, Stage};
use crate::publication::is_query_visible;

/// Validated (stage, group) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StandingsScope {
    pub stage: Stage,
    pub group_key: Option<String>,
}

impl StandingsScope {
    /// Build a scope, enforcing that a group key is given iff the stage is a mini-league
    ///
    /// # Errors
    ///
    /// * `StandingsError::InvalidQuery` - group key missing for a mini-league, or given for another stage
    pub fn new(stage: Stage, group_key: Option<String>) -> StandingsResult<Self> {
        let group_key = group_key
            .map(|group| group.trim().to_string())
            .filter(|group| !group.is_empty());

        match (stage, &group_key) {
            (Stage::MiniLeague, None) => Err(StandingsError::InvalidQuery(
                "mini_league standings require a group".to_string(),
            )),
            (Stage::RegularSeason | Stage::Final, Some(group)) => {
                Err(StandingsError::InvalidQuery(format!(
                    "group '{group}' is only valid for mini_league standings"
                )))
            }
            _ => Ok(Self { stage, group_key }),
        }
    }

    /// Regular season scope
    pub fn regular_season() -> Self {
        Self {
            stage: Stage::RegularSeason,
            group_key: None,
        }
    }
}

/// Who is asking: public views never see unpublished or rehearsal finals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Admin,
}

/// Unvalidated standings query as received from a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsRequest {
    pub stage: String,
    pub group: Option<String>,
    pub include_unpublished_finals: bool,
    pub include_idle_teams: bool,
}

impl StandingsRequest {
    /// Public request for a stage
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    /// Restrict to a mini-league group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Ask for admin visibility (unpublished finals included)
    pub fn with_unpublished_finals(mut self) -> Self {
        self.include_unpublished_finals = true;
        self
    }

    /// List roster teams that have not played yet
    pub fn with_idle_teams(mut self) -> Self {
        self.include_idle_teams = true;
        self
    }
}

/// A request after validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedQuery {
    pub scope: StandingsScope,
    pub visibility: Visibility,
    pub include_idle_teams: bool,
}

impl ResolvedQuery {
    /// Cache key covering the full query scope
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.scope.stage,
            self.scope.group_key.as_deref().unwrap_or("-"),
            match self.visibility {
                Visibility::Public => "public",
                Visibility::Admin => "admin",
            },
            if self.include_idle_teams { "roster" } else { "played" }
        )
    }
}

/// Validate a request into a scope.
///
/// # Errors
///
/// * `StandingsError::InvalidQuery` - unknown stage, bad group key, or idle teams outside the regular season
pub fn resolve_scope(request: &StandingsRequest) -> StandingsResult<ResolvedQuery> {
    let stage: Stage = request.stage.parse()?;
    let scope = StandingsScope::new(stage, request.group.clone())?;

    if request.include_idle_teams && stage != Stage::RegularSeason {
        return Err(StandingsError::InvalidQuery(
            "idle teams can only be listed for the regular season".to_string(),
        ));
    }

    Ok(ResolvedQuery {
        scope,
        visibility: if request.include_unpublished_finals {
            Visibility::Admin
        } else {
            Visibility::Public
        },
        include_idle_teams: request.include_idle_teams,
    })
}

/// Keep the outcomes a consumer with `visibility` may aggregate
pub fn select_outcomes(outcomes: Vec<MatchOutcome>, visibility: Visibility) -> Vec<MatchOutcome> {
    outcomes
        .into_iter()
        .filter(|outcome| outcome.status == MatchStatus::Completed)
        .filter(|outcome| match visibility {
            Visibility::Admin => true,
            Visibility::Public => {
                !outcome.is_final() || (is_query_visible(outcome) && !outcome.is_test())
            }
        })
        .collect()
}

/// Runs a resolved query end to end, without caching
#[derive(Clone)]
pub struct StageRouter {
    reader: ResultLedgerReader,
    registry: Arc<dyn TeamRegistry>,
}

impl StageRouter {
    /// Create a new router
    pub fn new(reader: ResultLedgerReader, registry: Arc<dyn TeamRegistry>) -> Self {
        Self { reader, registry }
    }

    /// Compute the ranked table for a resolved query
    pub async fn compute(&self, query: &ResolvedQuery) -> StandingsResult<Vec<StandingsRow>> {
        let outcomes = self.reader.load_scope(&query.scope).await?;
        let outcomes = select_outcomes(outcomes, query.visibility);

        let mut rows = aggregate(&outcomes)?;

        if query.include_idle_teams {
            union_roster(&mut rows, self.registry.list_team_ids().await?);
        }

        let team_ids: Vec<_> = rows.keys().cloned().collect();
        let mut names = self.registry.team_names(&team_ids).await?;

        for row in rows.values_mut() {
            row.team_name = names.remove(&row.team_id).unwrap_or_else(|| {
                warn!("Team {} has no registry entry, using its id as name", row.team_id);
                row.team_id.clone()
            });
        }

        Ok(rank(rows))
    }
}
