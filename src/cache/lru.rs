//! # LRU (Least Recently Used) Cache Implementation
//!
//! A fixed-capacity cache that evicts the entry which has gone the longest without
//! being read (`get` hit) or written (`put`). Capacity counts entries, not bytes.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │                          LRUCache<K, V>                                  │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  map: HashMap<K, usize>          key ──► slot index                │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                                                          │
//!   │   ┌────────────────────────────────────────────────────────────────────┐ │
//!   │   │  nodes: Vec<Node<K, V>>          dense slot arena                  │ │
//!   │   │                                                                    │ │
//!   │   │  head ──► [slot 2] ⇄ [slot 0] ⇄ [slot 1] ◄── tail                  │ │
//!   │   │           (MRU)                  (LRU)                             │ │
//!   │   │                                                                    │ │
//!   │   │  prev/next are slot indices, NIL terminates the list               │ │
//!   │   └────────────────────────────────────────────────────────────────────┘ │
//!   │                                                                          │
//!   │   capacity: usize  (fixed, ≥ 1)                                          │
//!   └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The arena owns every node. The map only holds indices into it, so no handle to
//! cache internals ever escapes. Removing a node swap-removes it from the arena and
//! re-points the neighbours of the node that moved into its slot.
//!
//! ## Put Flow
//!
//! ```text
//!   put(key, value)
//!        │
//!        ▼
//!   key present? ── YES ──► overwrite value, move node to head, return old value
//!        │
//!        NO
//!        ▼
//!   len == capacity? ── NO ──► push node, link at head
//!        │
//!        YES
//!        ▼
//!   reuse the tail slot: drop old key from map, write new key/value,
//!   move slot to head (net len unchanged)
//! ```
//!
//! Recency is a single total order (list position), so entries inserted back to back
//! with no intervening use are evicted in insertion order.
//!
//! ## Operations
//!
//! | Method            | Complexity | Touches recency |
//! |-------------------|------------|-----------------|
//! | `get`             | O(1)       | yes (on hit)    |
//! | `put`             | O(1)       | yes             |
//! | `peek`            | O(1)       | no              |
//! | `contains`        | O(1)       | no              |
//! | `remove`          | O(1)       | -               |
//! | `pop_lru`         | O(1)       | -               |
//! | `touch`           | O(1)       | yes             |
//! | `recency_rank`    | O(n)       | no              |
//! | `clear`           | O(n)       | -               |
//!
//! ## Thread Safety
//!
//! Not safe for concurrent use without external locking. See
//! [`ConcurrentLRUCache`](crate::cache::concurrent::ConcurrentLRUCache) for an
//! internally synchronized variant.
//!
//! ## Example Usage
//!
//! ```rust
//! use lrukit::cache::lru::LRUCache;
//!
//! let mut cache = LRUCache::new(2).unwrap();
//! cache.put("a", 1);
//! cache.put("b", 2);
//! assert_eq!(cache.get(&"a"), Some(&1));
//!
//! // "b" is now least recently used
//! cache.put("c", 3);
//! assert!(!cache.contains(&"b"));
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use log::{debug, trace};

use crate::cache::cache_traits::{CacheStats, CoreCache, LRUCacheTrait, MutableCache};
use crate::common::config::CacheConfig;
use crate::common::exception::CacheError;

const NIL: usize = usize::MAX;

/// Upper bound on slots reserved up front; larger caches grow as entries arrive.
const MAX_PREALLOCATED_SLOTS: usize = 1024;

struct Node<K, V> {
    key: K,
    value: V,
    prev: usize,
    next: usize,
}

/// Result of placing a key into the cache.
enum Placement<K, V> {
    Updated(V),
    Inserted,
    Evicted(K, V),
}

/// LRU (Least Recently Used) Cache implementation.
pub struct LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    capacity: usize,
    map: HashMap<K, usize>,
    nodes: Vec<Node<K, V>>,
    head: usize,
    tail: usize,
    stats_enabled: bool,
    gets: u64,
    hits: u64,
    evictions: u64,
}

impl<K, V> LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// Fails with [`CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        Self::with_config(&CacheConfig::with_capacity(capacity))
    }

    pub fn with_config(config: &CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        debug!(
            "Creating LRU cache with capacity {} (stats {})",
            config.capacity,
            if config.enable_stats { "on" } else { "off" }
        );

        // Capacity is unbounded; reserve a bounded prefix and grow on demand.
        let reserved = config.capacity.min(MAX_PREALLOCATED_SLOTS);
        Ok(LRUCache {
            capacity: config.capacity,
            map: HashMap::with_capacity(reserved),
            nodes: Vec::with_capacity(reserved),
            head: NIL,
            tail: NIL,
            stats_enabled: config.enable_stats,
            gets: 0,
            hits: 0,
            evictions: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let found = self.map.get(key).copied();
        if self.stats_enabled {
            self.gets += 1;
            if found.is_some() {
                self.hits += 1;
            }
        }

        match found {
            Some(idx) => {
                trace!("LRU hit at slot {}", idx);
                self.move_to_front(idx);
                Some(&self.nodes[idx].value)
            }
            None => {
                trace!("LRU miss");
                None
            }
        }
    }

    /// Returns the value for `key` without changing its recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).map(|&idx| &self.nodes[idx].value)
    }

    /// Membership test. Never counts as a use.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Inserts or overwrites `key`, making it most recently used.
    ///
    /// Returns the previous value when the key was already present. When a new key
    /// arrives at a full cache the least recently used entry is dropped first.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        match self.place(key, value) {
            Placement::Updated(old) => Some(old),
            Placement::Inserted | Placement::Evicted(..) => None,
        }
    }

    /// Like [`put`](Self::put), but hands back the entry evicted to make room.
    ///
    /// Returns `None` for updates and for inserts that fit without eviction.
    pub fn put_evicting(&mut self, key: K, value: V) -> Option<(K, V)> {
        match self.place(key, value) {
            Placement::Evicted(k, v) => Some((k, v)),
            Placement::Updated(_) | Placement::Inserted => None,
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.map.remove(key)?;
        let (_, value) = self.take_slot(idx);
        Some(value)
    }

    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.map.remove(&self.nodes[idx].key);
        Some(self.take_slot(idx))
    }

    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.nodes.get(self.tail).map(|node| (&node.key, &node.value))
    }

    pub fn peek_mru(&self) -> Option<(&K, &V)> {
        self.nodes.get(self.head).map(|node| (&node.key, &node.value))
    }

    /// Marks `key` most recently used without reading it.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.map.get(key).copied() {
            Some(idx) => {
                self.move_to_front(idx);
                true
            }
            None => false,
        }
    }

    /// 0 = most recently used.
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let target = *self.map.get(key)?;
        let mut rank = 0;
        let mut cursor = self.head;
        while cursor != NIL {
            if cursor == target {
                return Some(rank);
            }
            rank += 1;
            cursor = self.nodes[cursor].next;
        }
        None
    }

    pub fn clear(&mut self) {
        debug!("Clearing LRU cache ({} entries)", self.nodes.len());
        self.map.clear();
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    /// Iterates from most to least recently used without touching recency.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.nodes.len(),
        }
    }

    fn place(&mut self, key: K, value: V) -> Placement<K, V> {
        if let Some(&idx) = self.map.get(&key) {
            self.move_to_front(idx);
            return Placement::Updated(std::mem::replace(&mut self.nodes[idx].value, value));
        }

        if self.nodes.len() >= self.capacity {
            // Reuse the tail slot in place
            let idx = self.tail;
            let old_key = std::mem::replace(&mut self.nodes[idx].key, key.clone());
            let old_value = std::mem::replace(&mut self.nodes[idx].value, value);
            self.map.remove(&old_key);
            self.map.insert(key, idx);
            self.move_to_front(idx);
            if self.stats_enabled {
                self.evictions += 1;
            }
            debug!(
                "Evicted least recently used entry (capacity {})",
                self.capacity
            );
            return Placement::Evicted(old_key, old_value);
        }

        let idx = self.nodes.len();
        self.nodes.push(Node {
            key: key.clone(),
            value,
            prev: NIL,
            next: NIL,
        });
        self.attach_front(idx);
        self.map.insert(key, idx);
        Placement::Inserted
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }

    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn move_to_front(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.detach(idx);
        self.attach_front(idx);
    }

    /// Unlinks and swap-removes a slot. The caller has already dropped its map entry.
    fn take_slot(&mut self, idx: usize) -> (K, V) {
        self.detach(idx);
        let node = self.nodes.swap_remove(idx);

        if idx < self.nodes.len() {
            // The former last slot now lives at `idx`
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            if prev != NIL {
                self.nodes[prev].next = idx;
            } else {
                self.head = idx;
            }
            if next != NIL {
                self.nodes[next].prev = idx;
            } else {
                self.tail = idx;
            }
            if let Some(slot) = self.map.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        (node.key, node.value)
    }

    #[cfg(test)]
    fn validate_invariants(&self) {
        assert!(self.nodes.len() <= self.capacity);
        assert_eq!(self.map.len(), self.nodes.len());

        let mut seen = 0;
        let mut prev = NIL;
        let mut cursor = self.head;
        while cursor != NIL {
            let node = &self.nodes[cursor];
            assert_eq!(node.prev, prev, "broken back link at slot {}", cursor);
            assert_eq!(self.map.get(&node.key), Some(&cursor));
            prev = cursor;
            cursor = node.next;
            seen += 1;
        }
        assert_eq!(prev, self.tail);
        assert_eq!(seen, self.nodes.len());
    }
}

/// Iterator over cache entries, most recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.front];
        self.front = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.back];
        self.back = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> fmt::Debug for LRUCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LRUCache")
            .field("capacity", &self.capacity)
            .field("len", &self.nodes.len())
            .field("entries", &lru_first_entries(self))
            .finish()
    }
}

fn lru_first_entries<'a, K, V>(cache: &'a LRUCache<K, V>) -> Vec<(&'a K, &'a V)>
where
    K: Eq + Hash + Clone,
{
    cache.iter().rev().collect()
}

/// Renders as `LRUCache(capacity=3, size=2, items=[a: 1, b: 2])`, least recent first.
impl<K, V> fmt::Display for LRUCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LRUCache(capacity={}, size={}, items=[",
            self.capacity,
            self.nodes.len()
        )?;
        for (i, (key, value)) in self.iter().rev().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "])")
    }
}

impl<K, V> CoreCache<K, V> for LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        LRUCache::put(self, key, value)
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        LRUCache::get(self, key)
    }

    fn contains(&self, key: &K) -> bool {
        LRUCache::contains(self, key)
    }

    fn len(&self) -> usize {
        LRUCache::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LRUCache::clear(self)
    }
}

impl<K, V> MutableCache<K, V> for LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<V> {
        LRUCache::remove(self, key)
    }
}

impl<K, V> LRUCacheTrait<K, V> for LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LRUCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LRUCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LRUCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LRUCache::recency_rank(self, key)
    }
}

impl<K, V> CacheStats for LRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn total_gets(&self) -> u64 {
        self.gets
    }

    fn total_hits(&self) -> u64 {
        self.hits
    }

    fn total_evictions(&self) -> u64 {
        self.evictions
    }

    fn reset_stats(&mut self) {
        self.gets = 0;
        self.hits = 0;
        self.evictions = 0;
    }
}
