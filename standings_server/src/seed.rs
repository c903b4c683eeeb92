//! Seed data for the in-memory store.
//!
//! ```json
//! {
//!   "teams": [{ "id": "a", "name": "Alpha" }],
//!   "matches": [{
//!     "id": "m1", "stage": "regular_season", "homeTeamId": "a", "awayTeamId": "b",
//!     "status": "completed", "homeTeamScore": 2, "awayTeamScore": 1
//!   }]
//! }
//! ```

use anyhow::Context;
use serde::Deserialize;
use standings::MatchRecord;
use standings::db::InMemoryStore;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct SeedTeam {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub teams: Vec<SeedTeam>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl SeedFile {
    /// Build a store holding the seeded teams and records
    pub fn into_store(self) -> InMemoryStore {
        let store = self
            .teams
            .into_iter()
            .fold(InMemoryStore::new(), |store, team| store.with_team(team.id, team.name));

        self.matches
            .into_iter()
            .fold(store, |store, record| store.with_record(record))
    }
}

/// Read and parse a seed file
pub fn load(path: &Path) -> anyhow::Result<SeedFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;

    let seed: SeedFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    tracing::info!(
        "Loaded {} teams and {} match records from {}",
        seed.teams.len(),
        seed.matches.len(),
        path.display()
    );

    Ok(seed)
}
