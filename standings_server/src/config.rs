//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use standings::db::DatabaseConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Longest allowed cache TTL
pub const MAX_CACHE_TTL_SECS: u64 = 3600;

/// Shortest accepted admin token
pub const MIN_ADMIN_TOKEN_LEN: usize = 16;

/// Where match records and teams come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::Invalid {
                var: "STANDINGS_STORE".to_string(),
                reason: format!("Unknown store '{other}', expected 'postgres' or 'memory'"),
            }),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration (ignored by the memory backend)
    pub database: DatabaseConfig,
    /// Store backend
    pub store: StoreBackend,
    /// Bearer token for admin routes
    pub admin_token: String,
    /// Freshness window for computed standings
    pub cache_ttl: Duration,
    /// Optional Prometheus listener
    pub metrics_bind: Option<SocketAddr>,
    /// JSON file of teams and match records preloaded into the memory backend
    pub seed_file: Option<PathBuf>,
}

/// CLI values that take priority over the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub memory: bool,
    pub seed_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or set to unparseable values
    pub fn from_env(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_env_or("SERVER_BIND", "127.0.0.1:6969")?,
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = overrides.database_url {
            database = database.with_url(url);
        }

        let store = if overrides.memory {
            StoreBackend::Memory
        } else {
            std::env::var("STANDINGS_STORE")
                .map(|raw| raw.parse::<StoreBackend>())
                .unwrap_or(Ok(StoreBackend::Postgres))?
        };

        let admin_token =
            std::env::var("STANDINGS_ADMIN_TOKEN").map_err(|_| ConfigError::MissingRequired {
                var: "STANDINGS_ADMIN_TOKEN".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            })?;

        let cache_ttl_secs: u64 = parse_env_or("STANDINGS_CACHE_TTL_SECS", "30")?;

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(raw) => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("'{raw}' is not an IP:PORT address"),
            })?),
            Err(_) => None,
        };

        let seed_file = overrides
            .seed_file
            .or_else(|| std::env::var("STANDINGS_SEED_FILE").ok().map(PathBuf::from));

        Ok(ServerConfig {
            bind,
            database,
            store,
            admin_token,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            metrics_bind,
            seed_file,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_token.len() < MIN_ADMIN_TOKEN_LEN {
            return Err(ConfigError::Invalid {
                var: "STANDINGS_ADMIN_TOKEN".to_string(),
                reason: format!("Must be at least {MIN_ADMIN_TOKEN_LEN} characters"),
            });
        }

        if self.cache_ttl.as_secs() > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::Invalid {
                var: "STANDINGS_CACHE_TTL_SECS".to_string(),
                reason: format!("Must be at most {MAX_CACHE_TTL_SECS} seconds"),
            });
        }

        if self.seed_file.is_some() && self.store != StoreBackend::Memory {
            return Err(ConfigError::Invalid {
                var: "STANDINGS_SEED_FILE".to_string(),
                reason: "Seed data is only loaded by the memory store".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server bind address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, using `default` when unset.
///
/// A set but malformed value is an error rather than a silent fallback.
fn parse_env_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var: key.to_string(),
        reason: format!("Could not parse '{raw}'"),
    })
}
