//! # LRU Cache Module
//!
//! A capacity-bounded least-recently-used cache used by terrain generators to memoise
//! per-column intermediate data. Streaming never consults it.
//!
//! Recency is refreshed on every [`LruCache::get`] and on every [`LruCache::insert`],
//! including inserts that overwrite an existing key. Inserting past capacity evicts
//! the least-recently-used entry.

use std::{hash::Hash, num::NonZeroUsize};

/// A bounded map that forgets its least-recently-used entry when full.
pub struct LruCache<K: Hash + Eq, V> {
    entries: lru::LruCache<K, V>,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let Some(capacity) = NonZeroUsize::new(capacity) else {
            panic!("LRU cache capacity must be greater than zero");
        };
        LruCache {
            entries: lru::LruCache::new(capacity),
        }
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Stores `value` under `key`, marking it most recently used.
    ///
    /// An existing value for `key` is overwritten. When the cache is full and `key` is
    /// new, the least-recently-used entry is evicted first.
    ///
    /// # Returns
    /// A reference to the stored value.
    pub fn insert(&mut self, key: K, value: V) -> &V {
        self.entries.put(key.clone(), value);
        match self.entries.get(&key) {
            Some(value) => value,
            None => unreachable!("an entry is always present right after it was inserted"),
        }
    }

    /// Checks for `key` without touching recency.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }
}
