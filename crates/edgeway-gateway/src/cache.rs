use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Where a value returned by [`CacheAside::read_through`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheSource {
    Cache,
    Origin,
}

/// Cache-aside store holding at most one snapshot per resource collection.
///
/// Reads populate an entry on a miss; writes clear it. There is no TTL and no
/// per-record granularity. Two concurrent misses on the same key may both
/// fetch, in which case the later store wins.
#[derive(Debug)]
pub struct CacheAside<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for CacheAside<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> CacheAside<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached value for `key`, or runs `fetch`, stores its
    /// success and returns it. A failed fetch is propagated and nothing is
    /// stored.
    pub async fn read_through<F, Fut, E>(&self, key: &str, fetch: F) -> Result<(V, CacheSource), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            debug!("cache hit: {}", key);
            return Ok((value, CacheSource::Cache));
        }

        debug!("cache miss: {}", key);
        let value = fetch().await?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok((value, CacheSource::Origin))
    }

    /// Clears `key`. Returns `true` if an entry was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            debug!("cache invalidated: {}", key);
        }
        removed
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn read(cache: &CacheAside<Vec<u32>>, calls: &AtomicUsize) -> (Vec<u32>, CacheSource) {
        cache
            .read_through("animalPosts", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst) as u32 + 1;
                Ok::<_, String>(vec![n])
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_read_through_fetches_once_until_invalidated() {
        let cache = CacheAside::new();
        let calls = AtomicUsize::new(0);

        assert_eq!(read(&cache, &calls).await, (vec![1], CacheSource::Origin));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(read(&cache, &calls).await, (vec![1], CacheSource::Cache));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(cache.invalidate("animalPosts").await);
        assert_eq!(read(&cache, &calls).await, (vec![2], CacheSource::Origin));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache: CacheAside<Vec<u32>> = CacheAside::new();

        let err = cache
            .read_through("animalPosts", || async { Err::<Vec<u32>, _>("backend down") })
            .await
            .unwrap_err();
        assert_eq!(err, "backend down");
        assert!(!cache.contains("animalPosts").await);
    }

    #[tokio::test]
    async fn test_invalidate_missing_key() {
        let cache: CacheAside<String> = CacheAside::new();
        assert!(!cache.invalidate("animalPosts").await);
        assert!(cache.get("animalPosts").await.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = CacheAside::new();
        cache
            .read_through("a", || async { Ok::<_, ()>(1) })
            .await
            .unwrap();
        cache
            .read_through("b", || async { Ok::<_, ()>(2) })
            .await
            .unwrap();

        cache.invalidate("a").await;
        assert!(!cache.contains("a").await);
        assert_eq!(cache.get("b").await, Some(2));
    }

    #[test]
    fn test_cache_source_serializes_lowercase() {
        assert_eq!(serde_json::to_value(CacheSource::Cache).unwrap(), "cache");
    }
}
