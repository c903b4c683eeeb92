//! Read-through cache for computed standings.
//!
//! Entries age out after the caller's TTL and can be purged at any time.
//! Clearing the cache only changes staleness, never results.
//!
//! Concurrent misses on the same key may each run `compute`; the last write
//! wins. Lookups never hold the lock across `compute`.

use log::{debug, info};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A value served by the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue<T> {
    pub value: T,
    /// Time since the value was computed
    pub age: Duration,
    /// Whether the value came from the cache
    pub hit: bool,
}

/// Process-wide keyed memoization with per-call TTL
#[derive(Debug, Clone)]
pub struct ReadThroughCache<T> {
    entries: Arc<RwLock<HashMap<String, (T, Instant)>>>,
}

impl<T: Clone> Default for ReadThroughCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> ReadThroughCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Return the cached value for `key` if younger than `ttl`, otherwise run
    /// `compute`, store its result and return it.
    ///
    /// Errors from `compute` are returned as-is and never cached.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        compute: F,
    ) -> Result<CachedValue<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        {
            let entries = self.entries.read().await;
            if let Some((value, computed_at)) = entries.get(key) {
                let age = computed_at.elapsed();
                if age < ttl {
                    debug!("Cache hit for key: {} (age {:?})", key, age);
                    return Ok(CachedValue {
                        value: value.clone(),
                        age,
                        hit: true,
                    });
                }
            }
        }

        debug!("Cache miss for key: {}", key);
        let value = compute().await?;

        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.clone(), Instant::now()));

        Ok(CachedValue {
            value,
            age: Duration::ZERO,
            hit: false,
        })
    }

    /// Drop one entry
    pub async fn invalidate(&self, key: &str) {
        if self.entries.write().await.remove(key).is_some() {
            debug!("Invalidated cache for key: {}", key);
        }
    }

    /// Drop every entry, returning how many were removed
    pub async fn purge(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        info!("Purged {} standings cache entries", removed);
        removed
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
