//! Standings manager: the query and publication entry point.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::aggregator::StandingsRow;
use super::router::{StageRouter, StandingsRequest, resolve_scope};
use crate::cache::ReadThroughCache;
use crate::db::{MatchResultStore, TeamRegistry};
use crate::errors::StandingsResult;
use crate::outcome::{ResultLedgerReader, Stage};
use crate::publication::{PublicationGate, PublishOutcome};

/// Default freshness window for computed tables
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// A standings row with its table position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRow {
    /// 1-based position
    pub position: usize,
    pub row: StandingsRow,
}

/// A ranked table for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsTable {
    pub stage: Stage,
    pub group_key: Option<String>,
    pub rows: Vec<RankedRow>,
    /// Seconds since the table was computed
    pub age_secs: u64,
    /// Whether the table was served from cache
    pub cached: bool,
}

/// Standings manager
#[derive(Clone)]
pub struct StandingsManager {
    router: StageRouter,
    gate: PublicationGate,
    store: Arc<dyn MatchResultStore>,
    cache: ReadThroughCache<Vec<StandingsRow>>,
    cache_ttl: Duration,
}

impl StandingsManager {
    /// Create a new standings manager
    ///
    /// # Arguments
    ///
    /// * `store` - Match result store
    /// * `registry` - Team registry used for display names and the idle-team roster
    /// * `cache_ttl` - Freshness window for computed tables
    pub fn new(
        store: Arc<dyn MatchResultStore>,
        registry: Arc<dyn TeamRegistry>,
        cache_ttl: Duration,
    ) -> Self {
        let reader = ResultLedgerReader::new(store.clone());

        Self {
            router: StageRouter::new(reader, registry),
            gate: PublicationGate::new(store.clone()),
            store,
            cache: ReadThroughCache::new(),
            cache_ttl,
        }
    }

    /// Configured cache TTL
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Get the ranked standings for a request.
    ///
    /// Either the full table is returned or an error; never a partial ranking.
    ///
    /// # Errors
    ///
    /// * `StandingsError::InvalidQuery` - malformed scope; no store access happens
    /// * `StandingsError::PreconditionViolated` - a non-completed outcome reached aggregation
    /// * `StandingsError::DependencyUnavailable` - store or registry failure
    pub async fn standings(&self, request: &StandingsRequest) -> StandingsResult<StandingsTable> {
        let query = resolve_scope(request)?;
        let key = query.cache_key();

        let cached = self
            .cache
            .get_or_compute(&key, self.cache_ttl, || self.router.compute(&query))
            .await?;

        debug!(
            "Standings for {} ({} rows, cached: {})",
            key,
            cached.value.len(),
            cached.hit
        );

        let rows = cached
            .value
            .into_iter()
            .enumerate()
            .map(|(index, row)| RankedRow {
                position: index + 1,
                row,
            })
            .collect();

        Ok(StandingsTable {
            stage: query.scope.stage,
            group_key: query.scope.group_key,
            rows,
            age_secs: cached.age.as_secs(),
            cached: cached.hit,
        })
    }

    /// Publish pending finals and drop cached tables so the change is visible immediately
    pub async fn publish_pending_finals(&self, is_test: bool) -> StandingsResult<PublishOutcome> {
        let outcome = self.gate.publish_pending_finals(is_test).await;

        // Purge even on a partial failure: some finals may already be flipped.
        if !matches!(outcome, Ok(PublishOutcome::NothingToPublish)) {
            self.cache.purge().await;
        }

        outcome
    }

    /// Manually drop every cached table
    pub async fn purge_cache(&self) -> usize {
        let removed = self.cache.purge().await;
        info!("Standings cache purged on request ({} entries)", removed);
        removed
    }

    /// Check the match result store
    pub async fn health_check(&self) -> StandingsResult<()> {
        self.store.health_check().await
    }
}
