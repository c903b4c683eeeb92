//! Match outcomes and the result ledger reader.
//!
//! The reader is the only place that knows how match records are stored.
//! Everything downstream works on [`MatchOutcome`].

pub mod models;
pub mod reader;

pub use models::{
    FinalsPublication, MatchId, MatchOutcome, MatchStatus, PublicationState, Score, Stage, TeamId,
};
pub use reader::{MatchRecord, ResultLedgerReader, normalize, normalize_all};
