//! Persistence collaborators that sit behind a cache
//!
//! A [`Backing`] is the slow, durable side of a
//! [`ThroughCache`](crate::ThroughCache): consulted on a miss, written on every
//! `set` and `remove`.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::hash::Hash;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use ahash::RandomState;
use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Durable key/value store a cache can be layered in front of
pub trait Backing<K, V>: Send + Sync {
    /// Fetch the stored value for `key`, if any
    fn load(&self, key: &K) -> Result<Option<V>>;

    /// Persist `value` under `key`, replacing any previous value
    fn store(&self, key: &K, value: &V) -> Result<()>;

    /// Delete `key`; returns `false` if nothing was stored
    fn delete(&self, key: &K) -> Result<bool>;
}

/// In-memory backing store, mostly useful for tests and as a reference
pub struct MemoryBacking<K, V> {
    map: RwLock<HashMap<K, V, RandomState>>,
}

impl<K, V> MemoryBacking<K, V>
where
    K: Hash + Eq,
{
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(RandomState::new())),
        }
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl<K, V> Default for MemoryBacking<K, V>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Backing<K, V> for MemoryBacking<K, V>
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn load(&self, key: &K) -> Result<Option<V>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn store(&self, key: &K, value: &V) -> Result<()> {
        self.map.write().insert(key.clone(), value.clone());
        Ok(())
    }

    fn delete(&self, key: &K) -> Result<bool> {
        Ok(self.map.write().remove(key).is_some())
    }
}

/// Longest key, in bytes, that [`DirBacking`] accepts.
///
/// Keys are hex-encoded into file names, which most filesystems cap at
/// 255 bytes.
pub const MAX_DIR_KEY_LEN: usize = 120;

/// File-per-key backing store
///
/// File layout:
/// - `<hex(key)>.val`: raw value bytes
/// - `.tmp*`: in-flight write, one per `store` call, renamed over `.val`
///   when complete
///
/// Keys must be non-empty and at most [`MAX_DIR_KEY_LEN`] bytes.
pub struct DirBacking {
    dir: PathBuf,
}

impl DirBacking {
    /// Open or create a store rooted at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the value files
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn file_stem(key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::InvalidKey("empty key".to_string()));
        }
        if key.len() > MAX_DIR_KEY_LEN {
            return Err(Error::InvalidKey(format!(
                "key is {} bytes (max {})",
                key.len(),
                MAX_DIR_KEY_LEN
            )));
        }
        let mut stem = String::with_capacity(key.len() * 2);
        for byte in key.bytes() {
            let _ = write!(stem, "{:02x}", byte);
        }
        Ok(stem)
    }

    fn value_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.val", Self::file_stem(key)?)))
    }
}

impl Backing<String, Vec<u8>> for DirBacking {
    fn load(&self, key: &String) -> Result<Option<Vec<u8>>> {
        match fs::read(self.value_path(key)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, key: &String, value: &Vec<u8>) -> Result<()> {
        let target = self.value_path(key)?;
        // Unique per call, so concurrent writers of one key never share it.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value)?;
        tmp.persist(&target).map_err(|e| e.error)?;
        Ok(())
    }

    fn delete(&self, key: &String) -> Result<bool> {
        match fs::remove_file(self.value_path(key)?) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
