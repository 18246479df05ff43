//! Configuration for the conversation cache.

use std::time::Duration;

/// Default maximum number of entries before LRU eviction.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Default entry TTL (24 hours, matching the conversation window).
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for a [`TtlCache`](crate::TtlCache).
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries to cache before LRU eviction.
    pub capacity: usize,

    /// Time-to-live for entries, measured from the write.
    /// `None` disables time-based expiration.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: Some(DEFAULT_TTL),
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of entries.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the TTL for entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Disable time-based expiration.
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }
}
