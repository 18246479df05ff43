//! Conversation cache with LRU eviction and TTL expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::ttl::TtlTracker;

/// Inner state protected by RwLock.
struct CacheInner<V> {
    lru: LruCache<String, V>,
    ttl: TtlTracker,
}

/// A bounded key-value cache with per-entry TTL.
///
/// Every mutation is an explicit call — `put`, `invalidate` — so callers
/// control exactly where invalidation happens relative to durable writes.
/// The cache holds derived projections only; it is never a system of record
/// and losing an entry is always safe.
pub struct TtlCache<V> {
    inner: Arc<RwLock<CacheInner<V>>>,
    config: CacheConfig,
}

impl<V: Clone + Send + Sync> TtlCache<V> {
    /// Create a new cache from configuration.
    pub fn new(config: CacheConfig) -> Self {
        let cap =
            NonZeroUsize::new(config.capacity).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());

        let inner = CacheInner {
            lru: LruCache::new(cap),
            ttl: TtlTracker::new(config.ttl),
        };

        Self {
            inner: Arc::new(RwLock::new(inner)),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the current number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Get a value if present and unexpired.
    ///
    /// Marks the entry recently used for LRU purposes. Reads do not extend
    /// the TTL; an expired entry is dropped and `None` returned.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write().await;

        if inner.ttl.is_expired(key) {
            if inner.lru.pop(key).is_some() {
                debug!(key = %key, "Cache entry expired");
            }
            inner.ttl.remove(key);
            return None;
        }

        let value = inner.lru.get(key).cloned();
        if value.is_some() {
            trace!(key = %key, "Cache hit");
        }
        value
    }

    /// Insert a value, restarting the key's TTL.
    ///
    /// At capacity the least recently used entry is evicted first.
    pub async fn put(&self, key: &str, value: V) {
        let mut inner = self.inner.write().await;

        if inner.lru.len() >= self.config.capacity && !inner.lru.contains(key) {
            let evicted = inner.lru.peek_lru().map(|(k, _)| k.clone());
            if let Some(evicted) = evicted {
                debug!(key = %evicted, "Evicting LRU cache entry");
                inner.lru.pop(&evicted);
                inner.ttl.remove(&evicted);
            }
        }

        inner.lru.put(key.to_string(), value);
        inner.ttl.record(key);

        trace!(key = %key, size = inner.lru.len(), "Cache entry written");
    }

    /// Drop an entry immediately.
    ///
    /// Called after every durable AI-turn write so the next read rebuilds
    /// from the record store.
    pub async fn invalidate(&self, key: &str) {
        let mut inner = self.inner.write().await;
        inner.ttl.remove(key);
        if inner.lru.pop(key).is_some() {
            debug!(key = %key, "Cache entry invalidated");
        }
    }

    /// Check if a key is present and unexpired (without touching LRU order).
    pub async fn contains(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner.lru.contains(key) && !inner.ttl.is_expired(key)
    }

    /// Remove all expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let expired = inner.ttl.drain_expired();
        let count = expired.len();

        for key in expired {
            inner.lru.pop(&key);
        }

        if count > 0 {
            debug!(count, "Cleaned up expired cache entries");
        }
        count
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: self.config.capacity,
            ttl_tracked: inner.ttl.len(),
        }
    }
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of cached entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of keys being tracked for TTL.
    pub ttl_tracked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = TtlCache::new(CacheConfig::new().with_capacity(10));

        cache.put("k-1", vec![1, 2, 3]).await;

        assert_eq!(cache.get("k-1").await, Some(vec![1, 2, 3]));
        assert_eq!(cache.get("missing").await, None::<Vec<i32>>);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = TtlCache::new(CacheConfig::new().with_capacity(3));

        for i in 1..=3 {
            cache.put(&format!("k-{}", i), i).await;
        }
        assert_eq!(cache.len().await, 3);

        // A 4th entry evicts k-1.
        cache.put("k-4", 4).await;

        assert_eq!(cache.len().await, 3);
        assert!(!cache.contains("k-1").await);
        assert!(cache.contains("k-2").await);
        assert!(cache.contains("k-4").await);
    }

    #[tokio::test]
    async fn test_access_updates_lru_order() {
        let cache = TtlCache::new(CacheConfig::new().with_capacity(3));

        for i in 1..=3 {
            cache.put(&format!("k-{}", i), i).await;
        }

        // Access k-1 so k-2 becomes the LRU entry.
        let _ = cache.get("k-1").await;
        cache.put("k-4", 4).await;

        assert!(cache.contains("k-1").await);
        assert!(!cache.contains("k-2").await);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = TtlCache::new(
            CacheConfig::new()
                .with_capacity(10)
                .with_ttl(Duration::from_millis(50)),
        );

        cache.put("k-1", 1).await;
        assert!(cache.contains("k-1").await);

        sleep(Duration::from_millis(100)).await;

        assert!(!cache.contains("k-1").await);
        assert_eq!(cache.get("k-1").await, None);
    }

    #[tokio::test]
    async fn test_reads_do_not_extend_ttl() {
        let cache = TtlCache::new(
            CacheConfig::new()
                .with_capacity(10)
                .with_ttl(Duration::from_millis(80)),
        );

        cache.put("k-1", 1).await;

        sleep(Duration::from_millis(50)).await;
        assert!(cache.get("k-1").await.is_some());

        sleep(Duration::from_millis(50)).await;
        // 100ms since the write: expired even though it was read at 50ms.
        assert_eq!(cache.get("k-1").await, None);
    }

    #[tokio::test]
    async fn test_rewrite_restarts_ttl() {
        let cache = TtlCache::new(
            CacheConfig::new()
                .with_capacity(10)
                .with_ttl(Duration::from_millis(80)),
        );

        cache.put("k-1", 1).await;
        sleep(Duration::from_millis(50)).await;
        cache.put("k-1", 2).await;
        sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("k-1").await, Some(2));
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = TtlCache::new(CacheConfig::new());

        cache.put("k-1", 1).await;
        assert!(cache.contains("k-1").await);

        cache.invalidate("k-1").await;
        assert!(!cache.contains("k-1").await);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let cache = TtlCache::new(
            CacheConfig::new()
                .with_capacity(10)
                .with_ttl(Duration::from_millis(50)),
        );

        for i in 1..=3 {
            cache.put(&format!("k-{}", i), i).await;
        }
        sleep(Duration::from_millis(100)).await;

        let cleaned = cache.cleanup_expired().await;
        assert_eq!(cleaned, 3);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_stats() {
        let cache = TtlCache::new(CacheConfig::new().with_capacity(100));

        for i in 1..=5 {
            cache.put(&format!("k-{}", i), i).await;
        }

        let stats = cache.stats().await;
        assert_eq!(stats.size, 5);
        assert_eq!(stats.capacity, 100);
        assert_eq!(stats.ttl_tracked, 5);
    }
}
