//! In-memory store for tests, demos and the server's `--memory` mode.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

use super::repository::{MatchResultStore, TeamRegistry};
use crate::errors::{StandingsError, StandingsResult};
use crate::outcome::{MatchRecord, MatchStatus, PublicationState, Stage, TeamId};

/// Match records and teams held in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<MatchRecord>>,
    teams: RwLock<BTreeMap<TeamId, String>>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
    /// Publish writes allowed before `mark_published` starts failing
    publish_budget: Mutex<Option<usize>>,
}

fn is_completed(record: &MatchRecord) -> bool {
    MatchStatus::parse(&record.status) == Some(MatchStatus::Completed)
}

fn in_stage(record: &MatchRecord, stage: Stage) -> bool {
    record.stage.parse::<Stage>().ok() == Some(stage)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a match record
    pub fn with_record(mut self, record: MatchRecord) -> Self {
        self.records.get_mut().push(record);
        self
    }

    /// Seed a team
    pub fn with_team(mut self, team_id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        self.teams.get_mut().insert(team_id.into(), name.into());
        self
    }

    /// Add a record after construction
    pub async fn insert_record(&self, record: MatchRecord) {
        self.records.write().await.push(record);
    }

    /// Snapshot of the stored records
    pub async fn records(&self) -> Vec<MatchRecord> {
        self.records.read().await.clone()
    }

    /// Number of list calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every call fail with `DependencyUnavailable`, or recover
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Let the next `writes` publish calls succeed and fail every one after,
    /// or lift the limit with `None`
    pub async fn limit_publish_writes(&self, writes: Option<usize>) {
        *self.publish_budget.lock().await = writes;
    }

    async fn take_publish_write(&self) -> StandingsResult<()> {
        let mut budget = self.publish_budget.lock().await;
        match budget.as_mut() {
            Some(0) => Err(StandingsError::DependencyUnavailable(
                "in-memory store rejected publish write".to_string(),
            )),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn check_available(&self) -> StandingsResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StandingsError::DependencyUnavailable(
                "in-memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MatchResultStore for InMemoryStore {
    async fn list_completed_records(
        &self,
        stage: Stage,
        group_key: Option<&str>,
    ) -> StandingsResult<Vec<MatchRecord>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| in_stage(r, stage) && is_completed(r))
            .filter(|r| match group_key {
                Some(group) => r.group_key.as_deref().map(str::trim) == Some(group),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn list_final_records(&self, is_test: bool) -> StandingsResult<Vec<MatchRecord>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| in_stage(r, Stage::Final) && is_completed(r))
            .filter(|r| r.is_test.unwrap_or(false) == is_test)
            .cloned()
            .collect())
    }

    async fn mark_published(&self, match_id: &str) -> StandingsResult<bool> {
        self.check_available()?;
        self.take_publish_write().await?;

        let mut records = self.records.write().await;
        let Some(record) = records
            .iter_mut()
            .find(|r| r.id == match_id && in_stage(r, Stage::Final))
        else {
            return Ok(false);
        };

        let mut state = PublicationState::from(record.is_published.unwrap_or(false));
        if !state.publish() {
            return Ok(false);
        }

        record.is_published = Some(state.is_published());
        Ok(true)
    }

    async fn health_check(&self) -> StandingsResult<()> {
        self.check_available()
    }
}

#[async_trait]
impl TeamRegistry for InMemoryStore {
    async fn team_name(&self, team_id: &str) -> StandingsResult<Option<String>> {
        self.check_available()?;
        Ok(self.teams.read().await.get(team_id).cloned())
    }

    async fn list_team_ids(&self) -> StandingsResult<Vec<TeamId>> {
        self.check_available()?;
        Ok(self.teams.read().await.keys().cloned().collect())
    }

    async fn team_names(&self, team_ids: &[TeamId]) -> StandingsResult<HashMap<TeamId, String>> {
        self.check_available()?;
        let teams = self.teams.read().await;
        Ok(team_ids
            .iter()
            .filter_map(|id| teams.get(id).map(|name| (id.clone(), name.clone())))
            .collect())
    }
}
