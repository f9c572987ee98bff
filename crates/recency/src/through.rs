//! ThroughCache: LRU cache in front of a durable backing store
//!
//! Each operation holds one lock across the backing call and the cache
//! update, so a concurrent `remove` can never be undone by a read-through
//! that loaded the old value before it.

use std::hash::Hash;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::backing::Backing;
use crate::error::Result;
use crate::shared::SharedLruCache;
use crate::stats::CacheStats;

/// Read-through / write-through layer combining an LRU cache with a backing store
pub struct ThroughCache<K, V, B> {
    /// LRU cache for hot data
    cache: SharedLruCache<K, V>,

    /// Underlying persistent storage
    backing: B,

    /// Serializes composite operations
    op_lock: Mutex<()>,
}

impl<K, V, B> ThroughCache<K, V, B>
where
    K: Hash + Eq + Clone,
    V: Clone,
    B: Backing<K, V>,
{
    /// Create a new ThroughCache with the given capacity
    ///
    /// # Arguments
    /// * `backing` - Durable store consulted on misses
    /// * `capacity` - Maximum number of items in cache
    pub fn new(backing: B, capacity: isize) -> Self {
        Self::with_cache(backing, SharedLruCache::new(capacity))
    }

    /// Layer an existing shared cache in front of `backing`
    ///
    /// Writes made through other clones of `cache` bypass this layer and are
    /// not kept in step with the backing store.
    pub fn with_cache(backing: B, cache: SharedLruCache<K, V>) -> Self {
        Self {
            cache,
            backing,
            op_lock: Mutex::new(()),
        }
    }

    /// Get a value from cache or storage
    ///
    /// A value loaded from storage is put into the cache.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let _guard = self.op_lock.lock();
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value));
        }

        let loaded = self
            .backing
            .load(key)
            .inspect_err(|e| warn!(error = %e, "backing load failed"))?;

        match loaded {
            Some(value) => {
                debug!("read-through populated cache");
                self.cache.set(key.clone(), value.clone());
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Put a value into storage and cache
    ///
    /// The value is persisted even when the cache rejects it; the return
    /// value reports whether the cache accepted it.
    pub fn set(&self, key: K, value: V) -> Result<bool> {
        let _guard = self.op_lock.lock();
        self.backing
            .store(&key, &value)
            .inspect_err(|e| warn!(error = %e, "backing store failed"))?;
        debug!("write-through stored value");

        Ok(self.cache.set(key, value))
    }

    /// Delete a value from cache and storage
    ///
    /// Returns `true` if either side held the key.
    pub fn remove(&self, key: &K) -> Result<bool> {
        let _guard = self.op_lock.lock();
        let cached = self.cache.remove(key);
        let stored = self
            .backing
            .delete(key)
            .inspect_err(|e| warn!(error = %e, "backing delete failed"))?;

        Ok(cached || stored)
    }

    /// Drop a key from the cache only (storage remains unchanged)
    pub fn invalidate(&self, key: &K) -> bool {
        let _guard = self.op_lock.lock();
        self.cache.remove(key)
    }

    /// Clear the cache (storage remains unchanged)
    pub fn clear_cache(&self) {
        let _guard = self.op_lock.lock();
        self.cache.clear();
    }

    /// Get the cache layer
    pub fn cache(&self) -> &SharedLruCache<K, V> {
        &self.cache
    }

    /// Get the backing store
    pub fn backing(&self) -> &B {
        &self.backing
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        self.cache.stats()
    }
}
