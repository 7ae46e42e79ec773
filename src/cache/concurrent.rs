//! Thread-safe LRU cache.
//!
//! Wraps an [`LRUCache`] holding `Arc<V>` behind a `parking_lot::Mutex`. A single
//! mutex rather than a reader-writer lock: `get` reorders the recency list, so
//! every lookup that counts as a use is a write.
//!
//! Values come back as `Arc<V>` clones, so callers never hold the lock while they
//! work with a value.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::cache_traits::{CacheStats, ConcurrentCache};
use crate::cache::lru::LRUCache;
use crate::common::config::CacheConfig;
use crate::common::exception::CacheError;

/// Point-in-time copy of the counters of a [`ConcurrentLRUCache`].
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheStatsSnapshot {
    pub gets: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
}

pub struct ConcurrentLRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: Mutex<LRUCache<K, Arc<V>>>,
}

impl<K, V> ConcurrentLRUCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        Ok(Self {
            inner: Mutex::new(LRUCache::new(capacity)?),
        })
    }

    pub fn with_config(config: &CacheConfig) -> Result<Self, CacheError> {
        Ok(Self {
            inner: Mutex::new(LRUCache::with_config(config)?),
        })
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Looks up `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().peek(key).cloned()
    }

    pub fn put(&self, key: K, value: V) -> Option<Arc<V>> {
        self.put_arc(key, Arc::new(value))
    }

    /// Inserts an already shared value without copying it.
    pub fn put_arc(&self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        self.inner.lock().put(key, value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().contains(key)
    }

    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    pub fn pop_lru(&self) -> Option<(K, Arc<V>)> {
        self.inner.lock().pop_lru()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        let guard = self.inner.lock();
        CacheStatsSnapshot {
            gets: guard.total_gets(),
            hits: guard.total_hits(),
            misses: guard.total_misses(),
            evictions: guard.total_evictions(),
            hit_ratio: guard.hit_ratio(),
        }
    }

    pub fn reset_stats(&self) {
        self.inner.lock().reset_stats();
    }

    /// Runs `f` with exclusive access to the underlying cache.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LRUCache<K, Arc<V>>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<K, V> ConcurrentCache for ConcurrentLRUCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send + Sync,
{
}
