//! Cache configuration

use std::hash::Hash;

use tracing::warn;

use crate::lru::LruCache;
use crate::shared::SharedLruCache;

/// Environment variable read by [`CacheConfig::from_env`]
pub const CAPACITY_ENV: &str = "RECENCY_CAPACITY";

/// Capacity used when nothing else is configured
pub const DEFAULT_CAPACITY: isize = 10;

/// Construction parameters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries; zero or less builds an inert cache
    pub capacity: isize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Start from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the capacity
    pub fn with_capacity(mut self, capacity: isize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Read the capacity from `RECENCY_CAPACITY`, falling back to the default
    pub fn from_env() -> Self {
        Self::from_raw(std::env::var(CAPACITY_ENV).ok().as_deref())
    }

    fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match raw.trim().parse::<isize>() {
            Ok(capacity) => Self { capacity },
            Err(e) => {
                warn!(value = raw, error = %e, "ignoring unparseable {}", CAPACITY_ENV);
                Self::default()
            }
        }
    }

    /// Build a single-threaded cache
    pub fn build<K, V>(&self) -> LruCache<K, V>
    where
        K: Hash + Eq + Clone,
    {
        LruCache::new(self.capacity)
    }

    /// Build a lock-guarded cache that can be shared across threads
    pub fn build_shared<K, V>(&self) -> SharedLruCache<K, V>
    where
        K: Hash + Eq + Clone,
    {
        SharedLruCache::new(self.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::new();
        assert_eq!(config.capacity, 10);

        let cache: LruCache<u32, u32> = config.build();
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn test_config_from_raw() {
        assert_eq!(CacheConfig::from_raw(None).capacity, DEFAULT_CAPACITY);
        assert_eq!(CacheConfig::from_raw(Some(" 256 ")).capacity, 256);
        assert_eq!(CacheConfig::from_raw(Some("-1")).capacity, -1);
        assert_eq!(CacheConfig::from_raw(Some("lots")).capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_config_builds_shared() {
        let cache: SharedLruCache<&str, u8> = CacheConfig::new().with_capacity(1).build_shared();

        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }
}
