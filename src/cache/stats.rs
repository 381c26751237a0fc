//! Cache Statistics Module
//!
//! Tracks cache read outcomes and stale evictions.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how the cache has been used.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Reads served from a fresh entry
    pub hits: u64,
    /// Reads that found nothing or only a stale entry
    pub misses: u64,
    /// Entries dropped because they outlived their max age
    pub stale_evictions: u64,
    /// Current number of entries in the cache
    pub entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if nothing has been read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_stale_evictions(&mut self, count: usize) {
        self.stale_evictions += count as u64;
    }

    pub fn set_entries(&mut self, count: usize) {
        self.entries = count;
    }
}
