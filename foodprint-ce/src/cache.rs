//! Injected TTL cache abstraction
//!
//! Resolution logic only sees the [`Cache`] trait, so the in-process
//! [`MemoryCache`] can be swapped for a distributed cache without touching the
//! resolver. Values are idempotent lookups: concurrent writers may overwrite
//! each other and the last write wins.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Key/value cache with per-entry expiry
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Fetch a live entry
    async fn get(&self, key: &str) -> Option<V>;

    /// Store with the cache's default TTL
    async fn set(&self, key: String, value: V) {
        let ttl = self.ttl();
        self.set_with_ttl(key, value, ttl).await;
    }

    /// Store with an explicit TTL
    async fn set_with_ttl(&self, key: String, value: V, ttl: Duration);

    /// Drop one entry
    async fn invalidate(&self, key: &str);

    /// Default time-to-live for [`Cache::set`]
    fn ttl(&self) -> Duration;
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory TTL cache shared between request handlers
///
/// Expired entries are dropped lazily on read and swept on write once the map
/// grows past `sweep_threshold`.
pub struct MemoryCache<V> {
    entries: Arc<RwLock<HashMap<String, Entry<V>>>>,
    ttl: Duration,
    sweep_threshold: usize,
}

impl<V> MemoryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            sweep_threshold: 10_000,
        }
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: remove unless another writer refreshed it meanwhile
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= Instant::now() {
                entries.remove(key);
            }
        }
        None
    }

    async fn set_with_ttl(&self, key: String, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        if entries.len() >= self.sweep_threshold {
            entries.retain(|_, entry| entry.expires_at > now);
        }

        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
