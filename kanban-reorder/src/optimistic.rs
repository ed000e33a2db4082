//! Optimistic cache writes with snapshot rollback

use crate::cache::QueryCache;
use crate::error::Result;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tracing::{debug, warn};

/// A cache write made ahead of persistence, holding what to restore on failure.
///
/// The write happens in [`OptimisticUpdate::apply`]; the update is then
/// either committed or rolled back. Rolling back restores exactly the value
/// cached before the write, regardless of anything written since. An update
/// dropped without being settled rolls back.
#[must_use = "an optimistic update must be committed or rolled back"]
pub struct OptimisticUpdate<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    cache: Arc<QueryCache<K, V>>,
    key: K,
    snapshot: Option<V>,
    settled: bool,
}

impl<K, V> OptimisticUpdate<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Snapshot the entry under `key`, then rewrite it with `apply`.
    ///
    /// Snapshot and write happen under the same entry lock. When nothing is
    /// cached under `key` the write is skipped and rollback has nothing to
    /// restore.
    pub fn apply<F>(cache: &Arc<QueryCache<K, V>>, key: K, apply: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        let mut snapshot = None;
        cache.update(&key, |value| {
            snapshot = Some(value.clone());
            apply(value);
        });
        debug!(?key, cached = snapshot.is_some(), "optimistic update applied");
        Self {
            cache: Arc::clone(cache),
            key,
            snapshot,
            settled: false,
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// The value as it was before the write
    pub fn snapshot(&self) -> Option<&V> {
        self.snapshot.as_ref()
    }

    /// Keep the optimistic value
    pub fn commit(mut self) {
        self.settled = true;
        debug!(key = ?self.key, "optimistic update committed");
    }

    /// Put the snapshot back
    pub fn rollback(mut self) {
        warn!(key = ?self.key, "optimistic update rolled back");
        self.restore();
    }

    /// Commit on `Ok`, roll back on `Err`, passing the result through
    pub fn settle<T>(self, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(error) => {
                self.rollback();
                Err(error)
            }
        }
    }

    fn restore(&mut self) {
        self.settled = true;
        if let Some(snapshot) = self.snapshot.take() {
            self.cache.set(self.key.clone(), snapshot);
        }
    }
}

impl<K, V> Drop for OptimisticUpdate<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn drop(&mut self) {
        if !self.settled {
            warn!(key = ?self.key, "optimistic update dropped before settling, rolling back");
            self.restore();
        }
    }
}

/// Apply `apply` to the cached entry now, then settle it on `persist`'s result.
///
/// The cache write happens when this function is called, not when the
/// returned future is first polled.
pub fn with_optimistic_update<K, V, F, Fut, T>(
    cache: &Arc<QueryCache<K, V>>,
    key: K,
    apply: F,
    persist: Fut,
) -> impl Future<Output = Result<T>>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
    F: FnOnce(&mut V),
    Fut: Future<Output = Result<T>>,
{
    let pending = OptimisticUpdate::apply(cache, key, apply);
    async move { pending.settle(persist.await) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReorderError;

    fn cache_with(value: Vec<u32>) -> Arc<QueryCache<String, Vec<u32>>> {
        let cache = Arc::new(QueryCache::new());
        cache.set("k".to_string(), value);
        cache
    }

    #[tokio::test]
    async fn test_write_is_visible_before_persist_resolves() {
        let cache = cache_with(vec![1, 2, 3]);
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let fut = with_optimistic_update(
            &cache,
            "k".to_string(),
            |v| v.reverse(),
            async move {
                rx.await.map_err(|_| ReorderError::persistence("dropped"))?;
                Ok(())
            },
        );

        assert_eq!(cache.get(&"k".to_string()), Some(vec![3, 2, 1]));
        tx.send(()).unwrap();
        fut.await.unwrap();
        assert_eq!(cache.get(&"k".to_string()), Some(vec![3, 2, 1]));
    }

    #[tokio::test]
    async fn test_failure_restores_snapshot() {
        let cache = cache_with(vec![1, 2, 3]);
        let before = cache.get(&"k".to_string());

        let result: Result<()> = with_optimistic_update(
            &cache,
            "k".to_string(),
            |v| v.retain(|n| *n != 2),
            async { Err(ReorderError::persistence("offline")) },
        )
        .await;

        assert!(matches!(result, Err(ReorderError::Persistence { .. })));
        assert_eq!(cache.get(&"k".to_string()), before);
    }

    #[test]
    fn test_uncached_key_is_left_alone() {
        let cache: Arc<QueryCache<String, Vec<u32>>> = Arc::new(QueryCache::new());
        let update = OptimisticUpdate::apply(&cache, "k".to_string(), |v| v.push(1));
        assert!(update.snapshot().is_none());
        update.rollback();
        assert!(!cache.contains(&"k".to_string()));
    }

    #[tokio::test]
    async fn test_dropped_future_rolls_back() {
        let cache = cache_with(vec![1, 2, 3]);

        let fut = with_optimistic_update(
            &cache,
            "k".to_string(),
            |v| v.clear(),
            futures::future::pending::<Result<()>>(),
        );
        assert_eq!(cache.get(&"k".to_string()), Some(vec![]));

        drop(fut);
        assert_eq!(cache.get(&"k".to_string()), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_committed_update_survives_drop() {
        let cache = cache_with(vec![1]);
        let update = OptimisticUpdate::apply(&cache, "k".to_string(), |v| v.push(2));
        assert_eq!(update.snapshot(), Some(&vec![1]));
        update.commit();
        assert_eq!(cache.get(&"k".to_string()), Some(vec![1, 2]));
    }

    #[test]
    fn test_rollback_ignores_later_writes() {
        let cache = cache_with(vec![1]);
        let first = OptimisticUpdate::apply(&cache, "k".to_string(), |v| v.push(2));
        let second = OptimisticUpdate::apply(&cache, "k".to_string(), |v| v.push(3));
        assert_eq!(cache.get(&"k".to_string()), Some(vec![1, 2, 3]));

        // First one fails after the second was applied
        first.rollback();
        assert_eq!(cache.get(&"k".to_string()), Some(vec![1]));
        second.commit();
    }
}
