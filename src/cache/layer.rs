//! Cache layer that orchestrates caching logic with fetching.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use super::traits::CacheResult;

type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Cache layer keyed by string, with no eviction.
///
/// Each key owns a once-cell. Concurrent callers for a key that is not yet
/// cached wait on the same fetch instead of issuing their own.
pub struct CacheLayer<V> {
  slots: Mutex<HashMap<String, Slot<V>>>,
  /// Number of fetches started, successful or not
  fetches: AtomicUsize,
}

impl<V> CacheLayer<V> {
  pub fn new() -> Self {
    Self {
      slots: Mutex::new(HashMap::new()),
      fetches: AtomicUsize::new(0),
    }
  }

  fn slot(&self, key: &str) -> Slot<V> {
    // Never held across an await
    let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(slots.entry(key.to_string()).or_default())
  }

  /// Get the value for `key`, running `fetcher` if it is not cached yet.
  ///
  /// 1. If the key holds a value, return it
  /// 2. If another caller is fetching the key, wait for it
  /// 3. Otherwise run the fetcher and store its value
  ///
  /// A failed fetch is returned to this caller only and nothing is stored.
  pub async fn fetch_one<E, F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult<Arc<V>>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
  {
    let slot = self.slot(key);
    if let Some(value) = slot.get() {
      return Ok(CacheResult::from_cache(Arc::clone(value)));
    }

    let mut ran_fetcher = false;
    let value = slot
      .get_or_try_init(|| {
        ran_fetcher = true;
        self.fetches.fetch_add(1, Ordering::Relaxed);
        async move { fetcher().await.map(Arc::new) }
      })
      .await?;

    let value = Arc::clone(value);
    if ran_fetcher {
      Ok(CacheResult::from_network(value))
    } else {
      Ok(CacheResult::from_cache(value))
    }
  }

  /// Keys that currently hold a value, sorted.
  pub fn keys(&self) -> Vec<String> {
    let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
    let mut keys: Vec<String> = slots
      .iter()
      .filter(|(_, slot)| slot.initialized())
      .map(|(key, _)| key.clone())
      .collect();
    keys.sort();
    keys
  }

  /// Number of fetches started so far.
  pub fn fetch_count(&self) -> usize {
    self.fetches.load(Ordering::Relaxed)
  }
}

impl<V> Default for CacheLayer<V> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::CacheSource;
  use std::time::Duration;

  #[tokio::test]
  async fn test_fetch_then_cached() {
    let cache: CacheLayer<u32> = CacheLayer::new();

    let first = cache
      .fetch_one("a", || async { Ok::<_, String>(1) })
      .await
      .unwrap();
    assert_eq!(*first.data, 1);
    assert_eq!(first.source, CacheSource::Network);

    let second = cache
      .fetch_one("a", || async { Ok::<_, String>(2) })
      .await
      .unwrap();
    assert_eq!(*second.data, 1);
    assert_eq!(second.source, CacheSource::Cache);
    assert_eq!(cache.fetch_count(), 1);
  }

  #[tokio::test]
  async fn test_concurrent_fetches_are_shared() {
    let cache: CacheLayer<u32> = CacheLayer::new();
    let counter = AtomicUsize::new(0);
    let (cache, counter) = (&cache, &counter);

    let fetch = move || {
      cache.fetch_one("a", move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(7)
      })
    };

    let (a, b, c) = tokio::join!(fetch(), fetch(), fetch());
    assert_eq!(*a.unwrap().data, 7);
    assert_eq!(*b.unwrap().data, 7);
    assert_eq!(*c.unwrap().data, 7);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
    assert_eq!(cache.fetch_count(), 1);
  }

  #[tokio::test]
  async fn test_failure_is_not_cached() {
    let cache: CacheLayer<u32> = CacheLayer::new();

    let err = cache
      .fetch_one("a", || async { Err::<u32, _>("offline".to_string()) })
      .await
      .unwrap_err();
    assert_eq!(err, "offline");
    assert!(cache.keys().is_empty());

    let ok = cache
      .fetch_one("a", || async { Ok::<_, String>(3) })
      .await
      .unwrap();
    assert_eq!(*ok.data, 3);
    assert_eq!(cache.fetch_count(), 2);
  }

  #[tokio::test]
  async fn test_keys_are_independent() {
    let cache: CacheLayer<&'static str> = CacheLayer::new();

    cache
      .fetch_one("2024h2", || async { Ok::<_, String>("h2") })
      .await
      .unwrap();
    cache
      .fetch_one("2025h1", || async { Ok::<_, String>("h1") })
      .await
      .unwrap();

    assert_eq!(cache.keys(), vec!["2024h2", "2025h1"]);

    let cached = cache
      .fetch_one("2025h1", || async { Ok::<_, String>("other") })
      .await
      .unwrap();
    assert_eq!(*cached.data, "h1");
  }
}
