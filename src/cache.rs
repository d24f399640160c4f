//! Bounded insertion-ordered cache
//!
//! Entries are evicted oldest-inserted first once the cache grows past its
//! capacity. Reading an entry does not refresh it.

use indexmap::IndexMap;
use std::hash::Hash;

/// A fixed-capacity map that evicts its oldest insertions
#[derive(Debug, Clone)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    entries: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> BoundedCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: IndexMap::new(),
        }
    }

    /// Returns the maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Checks whether `key` is cached
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts an entry, evicting the oldest ones beyond capacity
    ///
    /// Replacing an existing key keeps its original insertion slot.
    ///
    /// # Returns
    ///
    /// The number of entries evicted
    pub fn insert(&mut self, key: K, value: V) -> usize {
        self.entries.insert(key, value);
        let overflow = self.entries.len().saturating_sub(self.capacity);
        if overflow > 0 {
            self.entries.drain(..overflow);
        }
        overflow
    }

    /// Returns the cached value for `key`, creating it with `make` on a miss
    ///
    /// A hit returns the stored value untouched, so a value is generated at
    /// most once while it stays cached. A miss may evict older entries.
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: K, make: F) -> &V
    where
        K: Clone,
    {
        if !self.entries.contains_key(&key) {
            let evicted = self.insert(key.clone(), make());
            if evicted > 0 {
                log::debug!("evicted {evicted} cached entries");
            }
        }
        &self.entries[&key]
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
