//! Keyed client-side cache of board state

use dashmap::DashMap;
use std::hash::Hash;
use tracing::trace;

#[derive(Debug, Clone)]
struct Cached<V> {
    value: V,
    generation: u64,
    stale: bool,
}

/// Concurrent query cache.
///
/// Every write bumps the entry's generation. `invalidate` keeps the value
/// readable but marks it stale until the next `set`.
#[derive(Debug)]
pub struct QueryCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Cached<V>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Clone of the cached value
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Replace the cached value, clearing any staleness
    pub fn set(&self, key: K, value: V) {
        trace!(?key, "cache set");
        match self.entries.get_mut(&key) {
            Some(mut entry) => {
                entry.value = value;
                entry.generation += 1;
                entry.stale = false;
            }
            None => {
                self.entries.insert(
                    key,
                    Cached {
                        value,
                        generation: 1,
                        stale: false,
                    },
                );
            }
        }
    }

    /// Rewrite the cached value in place. Returns false if nothing is cached
    /// under `key`, in which case `updater` is not called.
    pub fn update<F>(&self, key: &K, updater: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                updater(&mut entry.value);
                entry.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Mark the entry stale so readers know a refetch is due
    pub fn invalidate(&self, key: &K) {
        trace!(?key, "cache invalidate");
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.stale = true;
            entry.generation += 1;
        }
    }

    pub fn is_stale(&self, key: &K) -> bool {
        self.entries.get(key).map(|e| e.stale).unwrap_or(false)
    }

    /// Write counter for `key`; 0 when nothing was ever cached
    pub fn generation(&self, key: &K) -> u64 {
        self.entries.get(key).map(|e| e.generation).unwrap_or(0)
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
