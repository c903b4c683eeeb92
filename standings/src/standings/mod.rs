//! League tables: aggregation, tie-break ranking and stage routing.
//!
//! This module provides:
//! - Stateless aggregation of completed outcomes into standings rows
//! - A fixed tie-break cascade (points, goal difference, goals scored, name)
//! - Scope validation for regular season, mini-league groups and finals
//! - A cached query entry point that also fronts finals publication
//!
//! ## Example
//!
//! ```no_run
//! use standings::db::memory::InMemoryStore;
//! use standings::standings::{StandingsManager, StandingsRequest, DEFAULT_CACHE_TTL};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let manager = StandingsManager::new(store.clone(), store, DEFAULT_CACHE_TTL);
//!
//!     let table = manager
//!         .standings(&StandingsRequest::new("mini_league").with_group("Group A"))
//!         .await?;
//!
//!     for ranked in table.rows {
//!         println!("{}. {} {} pts", ranked.position, ranked.row.team_name, ranked.row.points);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod manager;
pub mod ranking;
pub mod router;

pub use aggregator::{POINTS_FOR_DRAW, POINTS_FOR_WIN, StandingsRow, aggregate, union_roster};
pub use manager::{DEFAULT_CACHE_TTL, RankedRow, StandingsManager, StandingsTable};
pub use ranking::{RankCriteria, TIE_BREAK_CASCADE, compare_rows, rank};
pub use router::{
    ResolvedQuery, StageRouter, StandingsRequest, StandingsScope, Visibility, resolve_scope,
    select_outcomes,
};
