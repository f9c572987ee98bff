//! # recency
//!
//! Fixed-capacity LRU cache with O(1) get, set and remove.
//!
//! ## Architecture
//! - **HashMap**: AHash map from key to arena handle (O(1) lookup)
//! - **LRU List**: Doubly-linked list threaded through an arena, bounded by
//!   head/tail sentinels (O(1) move-to-front and eviction)
//! - **SharedLruCache**: one mutex around the whole cache for multi-threaded use
//! - **ThroughCache**: read-through / write-through over any [`Backing`] store
//!
//! ## Contract
//! - `get` returns `None` for absent keys and refreshes present ones
//! - `set` returns `false` only when capacity is zero or negative
//! - `remove` returns `false` for absent keys
//!
//! ```
//! use recency::{CacheConfig, MemoryBacking, ThroughCache};
//!
//! let cache = ThroughCache::new(MemoryBacking::new(), CacheConfig::new().capacity);
//! cache.set("greeting", "hello")?;
//! assert_eq!(cache.get(&"greeting")?, Some("hello"));
//! # Ok::<(), recency::Error>(())
//! ```

#![warn(missing_docs)]

mod backing;
mod config;
mod error;
mod lru;
mod shared;
mod stats;
mod through;

pub use backing::{Backing, DirBacking, MemoryBacking, MAX_DIR_KEY_LEN};
pub use config::{CacheConfig, CAPACITY_ENV, DEFAULT_CAPACITY};
pub use error::{Error, Result};
pub use lru::{Iter, LruCache, SetOutcome};
pub use shared::SharedLruCache;
pub use stats::CacheStats;
pub use through::ThroughCache;
