//! TTL Cache Module
//!
//! Keyed store mapping a resource identifier to `(value, stored_at)`.
//! Staleness is decided per read against the caller's max age.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::SharedClock;

// == TTL Cache ==
/// Cache whose entries are evicted lazily when read past their max age.
pub struct TtlCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Read statistics
    stats: CacheStats,
    /// Time source for storage stamps and staleness checks
    clock: SharedClock,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            clock,
        }
    }

    // == Get ==
    /// Returns the value stored under `key` unless it is older than `max_age`.
    ///
    /// A stale entry is evicted and reported as absent.
    pub fn get(&mut self, key: &str, max_age: Duration) -> Option<V> {
        let now = self.clock.now_ms();

        let fresh = match self.entries.get(key) {
            Some(entry) => entry.is_fresh(now, max_age),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !fresh {
            self.entries.remove(key);
            self.stats.record_stale_evictions(1);
            self.stats.record_miss();
            debug!(key, "evicted stale cache entry");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Set ==
    /// Stores `value` stamped with the current time, overwriting any prior entry.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let entry = CacheEntry::new(value, self.clock.now_ms());
        self.entries.insert(key.into(), entry);
    }

    // == Remove ==
    /// Removes one entry. Returns true if something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Empties the cache. Statistics survive so hit rates span resets.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Sweep ==
    /// Evicts every entry older than `max_age` without waiting for a read.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, max_age: Duration) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now, max_age));
        let removed = before - self.entries.len();
        self.stats.record_stale_evictions(removed);
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_entries(self.entries.len());
        stats
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> std::fmt::Debug for TtlCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries.len())
            .field("stats", &self.stats)
            .finish()
    }
}
