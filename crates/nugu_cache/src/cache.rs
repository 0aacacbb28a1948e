//! In-process snapshot cache.

use derive_getters::Getters;
use nugu_error::NuguResult;
use nugu_interface::SnapshotCache;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Cache entry with value and expiration.
#[derive(Debug, Clone, Getters)]
pub struct CacheEntry {
    value: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Check if this entry is expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Get remaining time until expiration.
    pub fn time_remaining(&self) -> Option<Duration> {
        self.ttl.checked_sub(self.created_at.elapsed())
    }
}

/// Configuration for the snapshot cache.
#[derive(
    Debug, Clone, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct MemoryCacheConfig {
    /// Maximum number of keys held at once
    #[serde(default = "default_max_size")]
    max_size: usize,

    /// Whether caching is enabled
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_max_size() -> usize {
    64
}

fn default_enabled() -> bool {
    true
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    entries: HashMap<String, CacheEntry>,
    access_order: Vec<String>,
}

impl Entries {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
        self.access_order.push(key.to_string());
    }

    fn forget(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.access_order.iter().position(|k| k == key) {
            self.access_order.remove(pos);
        }
    }

    fn evict_lru(&mut self) {
        if !self.access_order.is_empty() {
            let key = self.access_order.remove(0);
            tracing::debug!(key = %key, "Evicting LRU entry");
            self.entries.remove(&key);
        }
    }
}

/// Snapshot cache kept in process memory.
///
/// Entries expire after their TTL and the least recently used key is
/// evicted once `max_size` keys are held.
///
/// # Example
///
/// ```
/// use nugu_cache::{MemoryCache, MemoryCacheConfig};
/// use nugu_interface::SnapshotCache;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let cache = MemoryCache::new(MemoryCacheConfig::default());
/// cache.set("allidols", b"[]".to_vec(), Duration::from_secs(60)).await.unwrap();
/// assert_eq!(cache.get("allidols").await.unwrap(), Some(b"[]".to_vec()));
/// # });
/// ```
#[derive(Debug)]
pub struct MemoryCache {
    config: MemoryCacheConfig,
    inner: Mutex<Entries>,
}

impl MemoryCache {
    /// Create a new cache with configuration.
    pub fn new(config: MemoryCacheConfig) -> Self {
        tracing::debug!(
            max_size = config.max_size,
            enabled = config.enabled,
            "Creating new MemoryCache"
        );
        Self {
            config,
            inner: Mutex::new(Entries::default()),
        }
    }

    /// Remove expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            inner.forget(key);
        }
        if !expired.is_empty() {
            tracing::info!(
                removed = expired.len(),
                remaining = inner.entries.len(),
                "Cleaned up expired cache entries"
            );
        }
        expired.len()
    }

    /// Clear all cache entries.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let count = inner.entries.len();
        inner.entries.clear();
        inner.access_order.clear();
        tracing::info!(cleared = count, "Cleared cache");
    }

    /// Get number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Check if cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(MemoryCacheConfig::default())
    }
}

#[async_trait::async_trait]
impl SnapshotCache for MemoryCache {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> NuguResult<Option<Vec<u8>>> {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, returning None");
            return Ok(None);
        }

        let mut inner = self.inner.lock().await;
        let Some(entry) = inner.entries.get(key) else {
            return Ok(None);
        };
        if entry.is_expired() {
            tracing::debug!("Cache entry expired, removing");
            inner.forget(key);
            return Ok(None);
        }

        tracing::debug!(time_remaining = ?entry.time_remaining(), "Cache hit");
        let value = entry.value.clone();
        inner.touch(key);
        Ok(Some(value))
    }

    #[tracing::instrument(skip(self, value), fields(bytes = value.len(), ttl = ?ttl))]
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> NuguResult<()> {
        if !self.config.enabled {
            tracing::debug!("Cache disabled, skipping insert");
            return Ok(());
        }

        let mut inner = self.inner.lock().await;
        if inner.entries.len() >= self.config.max_size && !inner.entries.contains_key(key) {
            inner.evict_lru();
        }
        inner.touch(key);
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
        Ok(())
    }
}
