//! Cache Statistics Module
//!
//! Tracks group performance metrics including hits, misses, loads and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks group performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of lookups answered from the cache
    pub hits: u64,
    /// Number of lookups that missed the cache
    pub misses: u64,
    /// Number of loader invocations
    pub loads: u64,
    /// Number of loader invocations that failed
    pub load_errors: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Bytes currently held by the cache
    pub used_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
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

    // == Record Load ==
    /// Counts one loader call and whether it failed.
    pub fn record_load(&mut self, ok: bool) {
        self.loads += 1;
        if !ok {
            self.load_errors += 1;
        }
    }
}
