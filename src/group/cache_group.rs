//! Cache Group Module
//!
//! Read-through cache: an `LruCache` behind one lock, filled from a loader.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{ByteView, CacheStats, Capacity, LruCache, OnEvict};
use crate::error::{CacheError, Result};
use crate::group::{Flight, Loader};

/// Cache state guarded as one unit: entries, recency order, byte counter and stats.
struct MainCache {
    lru: LruCache<ByteView>,
    stats: CacheStats,
}

// == Group ==
/// A named, byte-bounded read-through cache.
///
/// Lookups that miss call the group's [`Loader`]. Concurrent misses on the
/// same key share a single loader call. Groups are created through a
/// [`GroupRegistry`](crate::group::GroupRegistry).
pub struct Group {
    name: String,
    loader: Arc<dyn Loader>,
    cache: Mutex<MainCache>,
    flight: Flight<Result<ByteView>>,
}

impl Group {
    // == Constructor ==
    pub(crate) fn new(
        name: String,
        capacity: Capacity,
        loader: Arc<dyn Loader>,
        on_evict: Option<OnEvict<ByteView>>,
    ) -> Self {
        let lru = match on_evict {
            Some(on_evict) => LruCache::with_on_evict(capacity, on_evict),
            None => LruCache::new(capacity),
        };
        Self {
            name,
            loader,
            cache: Mutex::new(MainCache {
                lru,
                stats: CacheStats::new(),
            }),
            flight: Flight::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Get ==
    /// Returns the value for `key`, loading and caching it on a miss.
    ///
    /// # Errors
    /// - [`CacheError::InvalidKey`] for an empty key; neither cache nor loader is touched.
    /// - [`CacheError::Loader`] when the loader fails; nothing is cached, so the
    ///   next call tries the loader again.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        if let Some(value) = self.lookup(key).await {
            debug!("[{}] cache hit for {}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    async fn lookup(&self, key: &str) -> Option<ByteView> {
        let mut cache = self.cache.lock().await;
        let value = cache.lru.get(key).cloned();
        match value {
            Some(_) => cache.stats.record_hit(),
            None => cache.stats.record_miss(),
        }
        value
    }

    // == Load ==
    /// Fetches `key` from the loader, one call per key at a time.
    async fn load(&self, key: &str) -> Result<ByteView> {
        self.flight
            .run(key, move || async move {
                // An earlier flight for this key may have finished since our miss
                let cached = self.cache.lock().await.lru.get(key).cloned();
                if let Some(value) = cached {
                    return Ok(value);
                }

                info!("[{}] loading {}", self.name, key);
                let loaded = self.loader.load(key).await;

                let mut cache = self.cache.lock().await;
                cache.stats.record_load(loaded.is_ok());
                match loaded {
                    Ok(bytes) => {
                        let value = ByteView::from(bytes);
                        cache.lru.add(key, value.clone());
                        Ok(value)
                    }
                    Err(err) => {
                        warn!("[{}] loader failed for {}: {:#}", self.name, key, err);
                        Err(CacheError::loader(err))
                    }
                }
            })
            .await
    }

    // == Stats ==
    /// Returns a snapshot of the group's statistics.
    pub async fn stats(&self) -> CacheStats {
        let cache = self.cache.lock().await;
        let mut stats = cache.stats.clone();
        stats.evictions = cache.lru.evictions();
        stats.total_entries = cache.lru.len();
        stats.used_bytes = cache.lru.used_bytes();
        stats
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.cache.lock().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.lru.is_empty()
    }

    pub async fn capacity(&self) -> Capacity {
        self.cache.lock().await.lru.capacity()
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group").field("name", &self.name).finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::LoaderFn;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn scores_group(capacity: Capacity, calls: Arc<AtomicUsize>) -> Group {
        let db: HashMap<&str, &str> = [("Tom", "630"), ("Jack", "589"), ("Sam", "567")]
            .into_iter()
            .collect();
        let loader = LoaderFn::new(move |key: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            match db.get(key) {
                Some(v) => Ok(v.as_bytes().to_vec()),
                None => anyhow::bail!("{} not exist", key),
            }
        });
        Group::new("scores".to_string(), capacity, Arc::new(loader), None)
    }

    #[tokio::test]
    async fn test_group_loads_then_hits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = scores_group(Capacity::Unbounded, Arc::clone(&calls));

        for _ in 0..3 {
            for (key, score) in [("Tom", "630"), ("Jack", "589"), ("Sam", "567")] {
                assert_eq!(group.get(key).await.unwrap().to_string(), score);
            }
        }

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let stats = group.stats().await;
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.hits, 6);
        assert_eq!(stats.loads, 3);
        assert_eq!(stats.total_entries, 3);
    }

    #[tokio::test]
    async fn test_group_empty_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = scores_group(Capacity::Unbounded, Arc::clone(&calls));

        let result = group.get("").await;
        assert!(matches!(result, Err(CacheError::InvalidKey)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(group.stats().await, CacheStats::new());
    }

    #[tokio::test]
    async fn test_group_loader_error_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let group = scores_group(Capacity::Unbounded, Arc::clone(&calls));

        let err = group.get("unknown").await.unwrap_err();
        assert_eq!(err.to_string(), "unknown not exist");
        assert!(group.is_empty().await);

        assert!(group.get("unknown").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(group.stats().await.load_errors, 2);
    }

    #[tokio::test]
    async fn test_group_respects_capacity() {
        let calls = Arc::new(AtomicUsize::new(0));
        // Room for "Sam"+"567" and "Jack"+"589" but not Tom on top
        let group = scores_group(Capacity::Bounded(13), Arc::clone(&calls));

        group.get("Tom").await.unwrap();
        group.get("Sam").await.unwrap();
        group.get("Jack").await.unwrap();

        let stats = group.stats().await;
        assert_eq!(stats.used_bytes, 13);
        assert_eq!(stats.evictions, 1);

        // Tom was least recently used, so loading it again hits the loader
        group.get("Tom").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_group_on_evict_receives_entry() {
        let evicted = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&evicted);
        let loader = LoaderFn::new(|key: &str| Ok(key.as_bytes().to_vec()));
        let group = Group::new(
            "echo".to_string(),
            Capacity::Bounded(4),
            Arc::new(loader),
            Some(Box::new(move |key: &str, value: &ByteView| {
                sink.lock().push((key.to_string(), value.to_string()))
            })),
        );

        group.get("ab").await.unwrap();
        group.get("cd").await.unwrap();

        assert_eq!(*evicted.lock(), vec![("ab".to_string(), "ab".to_string())]);
    }
}
