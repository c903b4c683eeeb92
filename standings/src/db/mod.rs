//! Storage collaborators: PostgreSQL connection pooling, the match result
//! store and team registry traits, and an in-memory implementation.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod memory;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use memory::InMemoryStore;
pub use repository::{MatchResultStore, PgMatchResultStore, PgTeamRegistry, TeamRegistry};

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use standings::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::from_env();
    ///     let db = Database::new(&config).await?;
    ///     let (store, registry) = db.collaborators();
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Store and registry backed by this pool
    pub fn collaborators(&self) -> (Arc<dyn MatchResultStore>, Arc<dyn TeamRegistry>) {
        (
            Arc::new(PgMatchResultStore::new(self.pool.clone())),
            Arc::new(PgTeamRegistry::new(self.pool.clone())),
        )
    }

    /// Close the connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
