//! # Standings
//!
//! A competition standings engine: turns stored match results into ranked
//! league tables and gates finals results behind an explicit publication step.
//!
//! ## Pipeline
//!
//! A standings query flows through four stages:
//!
//! - **Read**: stored match records are normalized into [`MatchOutcome`]s,
//!   hiding the legacy and current score field names
//! - **Route**: the query scope (regular season, a mini-league group, or
//!   finals) is validated and outcomes are filtered by visibility
//! - **Aggregate**: completed outcomes fold into per-team [`StandingsRow`]s
//! - **Rank**: rows are ordered by points, goal difference, goals scored,
//!   then team name
//!
//! Computed tables are memoized in a read-through cache with a short TTL.
//! Publishing finals purges it.
//!
//! ## Core Modules
//!
//! - [`outcome`]: Canonical match outcomes and the result ledger reader
//! - [`standings`]: Aggregation, ranking, routing and the [`StandingsManager`]
//! - [`publication`]: The finals publication gate
//! - [`cache`]: Read-through cache
//! - [`db`]: Store traits, PostgreSQL and in-memory implementations
//!
//! ## Example
//!
//! ```
//! use standings::{MatchOutcome, Stage, aggregate, rank};
//!
//! let outcomes = vec![MatchOutcome::completed("m1", Stage::RegularSeason, "a", "b", 2, 1)];
//! let table = rank(aggregate(&outcomes).unwrap());
//! assert_eq!(table[0].team_id, "a");
//! assert_eq!(table[0].points, 3);
//! ```

pub mod cache;
pub mod db;
pub mod errors;
pub mod outcome;
pub mod publication;
pub mod standings;

pub use cache::{CachedValue, ReadThroughCache};
pub use errors::{StandingsError, StandingsResult};
pub use outcome::{MatchOutcome, MatchRecord, MatchStatus, ResultLedgerReader, Score, Stage};
pub use publication::{PublicationGate, PublishOutcome, PublishSummary};
pub use standings::{
    RankedRow, StandingsManager, StandingsRequest, StandingsRow, StandingsTable, aggregate, rank,
};
