//! SharedCache: thread-safe LRU cache with hit/miss statistics

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::lru::{LruCache, Put};
use crate::stats::CacheStats;

/// LRU cache that can be shared between threads
///
/// Every operation, `get` included, runs under one exclusive lock: a lookup
/// reorders the recency list, so there is no read-only path. Cloning is cheap
/// and yields another handle to the same cache.
pub struct SharedCache<K, V> {
    /// LRU cache guarded by a single lock
    cache: Arc<Mutex<LruCache<K, V>>>,

    /// Cache statistics
    stats: Arc<CacheStats>,

    /// Cache capacity
    capacity: usize,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
            capacity: self.capacity,
        }
    }
}

impl<K, V> From<LruCache<K, V>> for SharedCache<K, V> {
    fn from(cache: LruCache<K, V>) -> Self {
        let capacity = cache.capacity();

        Self {
            cache: Arc::new(Mutex::new(cache)),
            stats: Arc::new(CacheStats::new()),
            capacity,
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a new shared cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries, must be positive
    ///
    /// # Returns
    /// * `Result<SharedCache>` - `Error::InvalidArgument` for a non-positive capacity
    pub fn new<C: TryInto<usize>>(capacity: C) -> Result<Self> {
        Ok(LruCache::new(capacity)?.into())
    }

    /// Get a copy of a value, marking it most recently used
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.cache.lock().get(key).cloned();

        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }

        value
    }

    /// Insert a key-value pair, returning the value it replaced
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let outcome = self.cache.lock().push(key, value);

        match outcome {
            Put::Inserted => {
                self.stats.record_insert();
                None
            }
            Put::Updated(previous) => {
                self.stats.record_update();
                Some(previous)
            }
            Put::Evicted { .. } => {
                self.stats.record_insert();
                self.stats.record_eviction();
                None
            }
        }
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = self.cache.lock().remove(key);

        if removed.is_some() {
            self.stats.record_removal();
        }

        removed
    }

    /// Check for a key without touching its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().contains(key)
    }

    /// Snapshot of the keys, most recently used first
    pub fn keys(&self) -> Vec<K> {
        self.cache.lock().keys().cloned().collect()
    }

    /// Run several operations inside one critical section
    ///
    /// Statistics are not recorded for operations performed here.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LruCache<K, V>) -> R) -> R {
        let mut cache = self.cache.lock();
        f(&mut cache)
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get current number of entries
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        self.cache.lock().clear();
        self.stats.reset();
    }
}
