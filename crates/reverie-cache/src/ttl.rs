//! TTL tracking for cache entry expiration.
//!
//! Entries expire a fixed duration after they are written; reads never
//! extend an entry's lifetime. A stale conversation projection must be
//! rebuilt from the record store, not kept alive by being popular.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks write times for TTL-based expiration.
#[derive(Debug)]
pub struct TtlTracker {
    /// Insertion time for each key.
    write_times: HashMap<String, Instant>,

    /// TTL duration (None means no expiration).
    ttl: Option<Duration>,
}

impl TtlTracker {
    /// Create a new TTL tracker with the given duration.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            write_times: HashMap::new(),
            ttl,
        }
    }

    /// Record a write for a key (restarts its TTL timer).
    pub fn record(&mut self, key: &str) {
        self.write_times.insert(key.to_string(), Instant::now());
    }

    /// Check if a key has expired.
    pub fn is_expired(&self, key: &str) -> bool {
        match self.ttl {
            None => false,
            Some(ttl) => match self.write_times.get(key) {
                None => true, // No write record = expired
                Some(written) => written.elapsed() > ttl,
            },
        }
    }

    /// Remove tracking for a key.
    pub fn remove(&mut self, key: &str) {
        self.write_times.remove(key);
    }

    /// Remove all expired entries and return their keys.
    pub fn drain_expired(&mut self) -> Vec<String> {
        let expired: Vec<String> = match self.ttl {
            None => Vec::new(),
            Some(ttl) => {
                let now = Instant::now();
                self.write_times
                    .iter()
                    .filter(|(_, written)| now.duration_since(**written) > ttl)
                    .map(|(key, _)| key.clone())
                    .collect()
            }
        };
        for key in &expired {
            self.write_times.remove(key);
        }
        expired
    }

    /// Get the number of tracked keys.
    pub fn len(&self) -> usize {
        self.write_times.len()
    }

    /// Check if there are no tracked keys.
    pub fn is_empty(&self) -> bool {
        self.write_times.is_empty()
    }

    /// Get the configured TTL.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
