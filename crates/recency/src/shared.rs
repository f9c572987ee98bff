//! Thread-safe handle around [`LruCache`]
//!
//! Every call takes one mutex for its whole duration. `get` reorders the
//! recency list, so there is no read-only path that could share the lock.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::lru::{LruCache, SetOutcome};
use crate::stats::CacheStats;

/// Clonable, lock-guarded LRU cache shared across threads
pub struct SharedLruCache<K, V> {
    cache: Arc<Mutex<LruCache<K, V>>>,
    stats: Arc<CacheStats>,
}

impl<K, V> Clone for SharedLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<K, V> SharedLruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new shared cache with the given capacity
    pub fn new(capacity: isize) -> Self {
        Self::from_cache(LruCache::new(capacity))
    }

    /// Wrap an existing cache
    pub fn from_cache(cache: LruCache<K, V>) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Get a clone of the cached value, marking it most recently used
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let value = self.cache.lock().get(key).cloned();
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    /// Insert or update a key-value pair
    pub fn set(&self, key: K, value: V) -> bool {
        self.set_with_eviction(key, value).is_accepted()
    }

    /// Insert or update a key-value pair, reporting what happened
    pub fn set_with_eviction(&self, key: K, value: V) -> SetOutcome<K, V> {
        let outcome = self.cache.lock().set_with_eviction(key, value);
        self.stats.record_set(&outcome);
        outcome
    }

    /// Remove a key from the cache
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(key).is_some()
    }

    /// Remove a key from the cache and hand back its value
    pub fn take<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.cache.lock().remove_entry(key);
        if value.is_some() {
            self.stats.record_removal();
        }
        value
    }

    /// Check whether a key is resident without touching its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.lock().contains(key)
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> isize {
        self.cache.lock().capacity()
    }

    /// Clear the cache and reset statistics
    pub fn clear(&self) {
        self.cache.lock().clear();
        self.stats.reset();
    }

    /// Copy out all entries, most recently used first
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.cache
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}
