//! Store call timeout helpers.
//!
//! Every collaborator call is bounded so a stalled database surfaces as
//! `DependencyUnavailable` instead of hanging a standings request.

use std::time::Duration;
use tokio::time::timeout;

/// Default timeout for store reads (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the publish write path (10 seconds)
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for bounded store calls
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError {
    /// Call did not finish in time
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for bounded store calls
pub type TimeoutResult<T> = Result<T, TimeoutError>;

/// Run a database future with a deadline
///
/// # Example
///
/// ```no_run
/// use standings::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let rows = with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT document FROM match_records WHERE stage = $1")
///         .bind("final")
///         .fetch_all(pool)
/// ).await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> TimeoutResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(TimeoutError::Database(e)),
        Err(_) => Err(TimeoutError::Timeout(duration)),
    }
}

/// Run a database future with the default read deadline
pub async fn with_default_timeout<F, T>(future: F) -> TimeoutResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    with_timeout(DEFAULT_QUERY_TIMEOUT, future).await
}
