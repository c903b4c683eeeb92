//! Standings engine error types.

use thiserror::Error;

use crate::db::timeouts::TimeoutError;

/// Standings engine errors
#[derive(Debug, Error)]
pub enum StandingsError {
    /// Malformed scope parameters (unknown stage, missing or forbidden group key)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// An upstream filtering invariant was broken before aggregation
    #[error("Precondition violated: {0}")]
    PreconditionViolated(String),

    /// A collaborator (match store, team registry) failed or timed out
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
}

impl StandingsError {
    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            StandingsError::DependencyUnavailable(_) => {
                "Standings data is temporarily unavailable".to_string()
            }
            StandingsError::PreconditionViolated(_) => "Internal server error".to_string(),
            StandingsError::InvalidQuery(_) => self.to_string(),
        }
    }
}

impl From<sqlx::Error> for StandingsError {
    fn from(err: sqlx::Error) -> Self {
        StandingsError::DependencyUnavailable(format!("database error: {err}"))
    }
}

impl From<TimeoutError> for StandingsError {
    fn from(err: TimeoutError) -> Self {
        StandingsError::DependencyUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for StandingsError {
    fn from(err: serde_json::Error) -> Self {
        StandingsError::DependencyUnavailable(format!("malformed stored document: {err}"))
    }
}

/// Result type for standings operations
pub type StandingsResult<T> = Result<T, StandingsError>;
