//! Competition standings server.
//!
//! Serves ranked league tables over HTTP and exposes the admin finals
//! publication gate, backed by PostgreSQL or an in-memory store.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Error};
use ctrlc::set_handler;
use pico_args::Arguments;
use standings::db::{Database, InMemoryStore, MatchResultStore, TeamRegistry};
use standings::standings::StandingsManager;
use standings_server::{
    api,
    config::{CliOverrides, ServerConfig, StoreBackend},
    logging, metrics, seed,
};
use tokio::sync::oneshot;
use tracing::info;

const HELP: &str = "\
Run the competition standings server

USAGE:
  standings_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --seed       FILE        JSON seed data for the in-memory store

FLAGS:
  --memory                 Use the in-memory store instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  STANDINGS_ADMIN_TOKEN    Bearer token for admin routes (required, 16+ chars)
  STANDINGS_CACHE_TTL_SECS Standings cache TTL in seconds [default: 30]
  STANDINGS_STORE          postgres | memory [default: postgres]
  STANDINGS_SEED_FILE      Seed data for the memory store
  METRICS_BIND             Prometheus listener address (optional)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        bind: pargs
            .opt_value_from_str::<_, SocketAddr>("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory: pargs.contains("--memory"),
        seed_file: pargs.opt_value_from_str::<_, PathBuf>("--seed")?,
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics available at http://{}/metrics", metrics_bind);
    }

    let (store, registry, database) = open_store(&config).await?;

    let manager = Arc::new(StandingsManager::new(store, registry, config.cache_ttl));
    info!(
        "Standings engine ready (store: {:?}, cache TTL: {}s)",
        config.store,
        config.cache_ttl.as_secs()
    );

    let app = api::create_router(api::AppState::new(manager, &config.admin_token));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal()?)
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    if let Some(database) = database {
        database.close().await;
    }

    Ok(())
}

/// Store, registry and the pool to close on shutdown (PostgreSQL only)
type Collaborators = (
    Arc<dyn MatchResultStore>,
    Arc<dyn TeamRegistry>,
    Option<Database>,
);

/// Build the configured store and registry
async fn open_store(config: &ServerConfig) -> Result<Collaborators, Error> {
    match config.store {
        StoreBackend::Memory => {
            let store = match &config.seed_file {
                Some(path) => seed::load(path)?.into_store(),
                None => InMemoryStore::new(),
            };
            let memory = Arc::new(store);
            let store: Arc<dyn MatchResultStore> = memory.clone();
            let registry: Arc<dyn TeamRegistry> = memory;
            info!("Using in-memory store");
            Ok((store, registry, None))
        }
        StoreBackend::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            info!("Database connected successfully");

            let (store, registry) = db.collaborators();
            Ok((store, registry, Some(db)))
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
fn shutdown_signal() -> Result<impl std::future::Future<Output = ()>, Error> {
    let (tx, rx) = oneshot::channel::<()>();
    let tx = Mutex::new(Some(tx));

    set_handler(move || {
        if let Some(tx) = tx.lock().ok().and_then(|mut pending| pending.take()) {
            let _ = tx.send(());
        }
    })?;

    Ok(async move {
        let _ = rx.await;
        info!("Shutdown signal received");
    })
}
