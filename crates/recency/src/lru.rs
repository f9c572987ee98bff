//! LRU (Least Recently Used) cache implementation
//!
//! Entries live in an arena of slots addressed by `usize` handles. The
//! recency ordering is a doubly-linked list threaded through those slots,
//! bounded by two sentinel slots: `HEAD` (most recently used side) and
//! `TAIL` (least recently used side). The hash map stores handles, so the
//! lookup view and the ordering view always describe the same entries.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::mem;

use ahash::RandomState;
use tracing::trace;

/// Sentinel slot in front of the most recently used entry.
const HEAD: usize = 0;

/// Sentinel slot behind the least recently used entry.
const TAIL: usize = 1;

/// Key/value payload of a live slot
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Slot in the arena. Sentinels and free slots carry no entry.
struct Node<K, V> {
    entry: Option<Entry<K, V>>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn sentinel(prev: usize, next: usize) -> Self {
        Self {
            entry: None,
            prev,
            next,
        }
    }
}

/// Result of [`LruCache::set_with_eviction`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome<K, V> {
    /// The cache has no room at all (capacity <= 0); nothing changed.
    Rejected,
    /// A new entry was added without displacing anything.
    Inserted,
    /// An existing entry was overwritten; carries the previous value.
    Updated(V),
    /// A new entry was added and the least recently used one was evicted.
    Evicted(K, V),
}

impl<K, V> SetOutcome<K, V> {
    /// Whether the cache accepted the write
    pub fn is_accepted(&self) -> bool {
        !matches!(self, SetOutcome::Rejected)
    }
}

/// LRU cache with fixed capacity
///
/// ```
/// use recency::LruCache;
///
/// let mut cache = LruCache::new(2);
/// cache.set("a", 1);
/// cache.set("b", 2);
/// cache.get(&"a");
/// cache.set("c", 3); // evicts "b"
///
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(&1));
/// ```
pub struct LruCache<K, V> {
    map: HashMap<K, usize, RandomState>,
    nodes: Vec<Node<K, V>>,
    free_list: Vec<usize>,
    capacity: isize,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a new LRU cache with the given capacity
    ///
    /// A capacity of zero or less is accepted; such a cache rejects every
    /// [`set`](Self::set).
    pub fn new(capacity: isize) -> Self {
        Self {
            map: HashMap::with_hasher(RandomState::new()),
            nodes: vec![Node::sentinel(HEAD, TAIL), Node::sentinel(HEAD, TAIL)],
            free_list: Vec::new(),
            capacity,
        }
    }

    /// Get a value from the cache, marking it most recently used
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        // Reordering a single-entry list is a no-op.
        if self.map.len() > 1 {
            self.move_to_front(idx);
        }
        self.nodes[idx].entry.as_ref().map(|entry| &entry.value)
    }

    /// Get a value without touching its recency
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.nodes[idx].entry.as_ref().map(|entry| &entry.value)
    }

    /// Check whether a key is resident without touching its recency
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Insert or update a key-value pair
    ///
    /// Returns `false` only when the cache was built with capacity <= 0.
    pub fn set(&mut self, key: K, value: V) -> bool {
        self.set_with_eviction(key, value).is_accepted()
    }

    /// Insert or update a key-value pair, reporting what happened
    pub fn set_with_eviction(&mut self, key: K, value: V) -> SetOutcome<K, V> {
        if self.capacity <= 0 {
            trace!(capacity = self.capacity, "set rejected");
            return SetOutcome::Rejected;
        }

        if let Some(&idx) = self.map.get(&key) {
            if let Some(entry) = self.nodes[idx].entry.as_mut() {
                let previous = mem::replace(&mut entry.value, value);
                self.move_to_front(idx);
                return SetOutcome::Updated(previous);
            }
        }

        let idx = self.alloc_node(Entry {
            key: key.clone(),
            value,
        });
        self.attach(HEAD, idx);
        self.map.insert(key, idx);

        // Inserts happen one at a time, so the bound is exceeded by at most one.
        if self.map.len() > self.capacity.unsigned_abs() {
            if let Some((key, value)) = self.evict() {
                trace!(len = self.map.len(), "evicted least recently used entry");
                return SetOutcome::Evicted(key, value);
            }
        }

        SetOutcome::Inserted
    }

    /// Remove a key from the cache
    ///
    /// Returns `false` when the key was not present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Remove a key from the cache and hand back its value
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.map.get(key)?;
        self.release(idx).map(|(_, value)| value)
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Capacity as given at construction
    pub fn capacity(&self) -> isize {
        self.capacity
    }

    /// Clear the cache
    pub fn clear(&mut self) {
        self.map.clear();
        self.nodes.truncate(2);
        self.nodes[HEAD] = Node::sentinel(HEAD, TAIL);
        self.nodes[TAIL] = Node::sentinel(HEAD, TAIL);
        self.free_list.clear();
    }

    /// Iterate from most recently used to least recently used
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
            remaining: self.map.len(),
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.nodes[HEAD].next == idx {
            return;
        }
        self.detach(idx);
        self.attach(HEAD, idx);
    }

    /// Link `idx` directly behind `after`.
    fn attach(&mut self, after: usize, idx: usize) {
        debug_assert!(idx > TAIL, "sentinels are never attached");
        debug_assert_eq!(self.nodes[idx].next, idx, "slot {idx} is already linked");

        let next = self.nodes[after].next;
        self.nodes[idx].prev = after;
        self.nodes[idx].next = next;
        self.nodes[next].prev = idx;
        self.nodes[after].next = idx;
    }

    /// Unlink `idx`, leaving it pointing at itself.
    fn detach(&mut self, idx: usize) {
        debug_assert!(idx > TAIL, "sentinels are never detached");

        let Node { prev, next, .. } = self.nodes[idx];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
        self.nodes[idx].prev = idx;
        self.nodes[idx].next = idx;
    }

    fn evict(&mut self) -> Option<(K, V)> {
        let lru = self.nodes[TAIL].prev;
        if lru == HEAD {
            return None;
        }
        self.release(lru)
    }

    /// Detach a live slot, drop it from the lookup map and recycle it.
    fn release(&mut self, idx: usize) -> Option<(K, V)> {
        self.detach(idx);
        let entry = self.nodes[idx].entry.take()?;
        self.map.remove(&entry.key);
        self.free_list.push(idx);
        Some((entry.key, entry.value))
    }

    fn alloc_node(&mut self, entry: Entry<K, V>) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx].entry = Some(entry);
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Node {
                entry: Some(entry),
                prev: idx,
                next: idx,
            });
            idx
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V>
where
    K: Hash + Eq + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        node.entry.as_ref().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

#[cfg(test)]
impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    /// Walk the list both ways and cross-check it against the lookup map.
    fn assert_consistent(&self) {
        let mut forward = 0;
        let mut prev = HEAD;
        let mut cursor = self.nodes[HEAD].next;
        while cursor != TAIL {
            let node = &self.nodes[cursor];
            assert_eq!(node.prev, prev, "broken back link at slot {cursor}");
            let entry = node.entry.as_ref().expect("linked slot without entry");
            assert_eq!(self.map.get(&entry.key), Some(&cursor));
            forward += 1;
            prev = cursor;
            cursor = node.next;
        }
        assert_eq!(self.nodes[TAIL].prev, prev);
        assert_eq!(forward, self.map.len());
        assert!(self.nodes[HEAD].entry.is_none());
        assert!(self.nodes[TAIL].entry.is_none());
        if self.capacity > 0 {
            assert!(self.map.len() <= self.capacity.unsigned_abs());
        } else {
            assert!(self.map.is_empty());
        }
    }
}
