use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::time::Instant;

/// How often the janitor sweeps expired entries
pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Process-lifetime cache whose entries expire a fixed duration after insertion
///
/// Cloning is cheap and shares the underlying map. Concurrent inserts for the same
/// key simply overwrite each other.
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    ttl: Duration,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
        }
    }
}

/// Handle for stopping the background janitor
pub struct CacheJanitorHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheJanitorHandle {
    /// Signals the janitor task to stop after its current sweep
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache janitor shutdown signal sent");
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the cached value if present and not yet expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    /// Stores a value, replacing any previous entry and restarting its TTL
    pub async fn put(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(key, Entry { value, expires_at });
    }

    /// Removes a single entry, returning whether it existed
    pub async fn evict(&self, key: &K) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    /// Drops every expired entry and returns how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Number of stored entries, including ones that expired but were not purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Spawns a background task that purges expired entries every `interval`
    pub fn spawn_janitor(&self, interval: Duration) -> CacheJanitorHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        let cache = self.clone();

        tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Cache janitor task started");
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = cache.purge_expired().await;
                        if purged > 0 {
                            tracing::debug!(purged, "Purged expired cache entries");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Cache janitor task stopped");
                        break;
                    }
                }
            }
        });

        CacheJanitorHandle { shutdown_tx }
    }
}
