//! In-memory cache store for development, tests and single-server deployments.
//!
//! Expiry is lazy: an expired entry reads as absent and is evicted on that
//! read. `purge_expired` compacts the map on demand.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::adapters::clock::SystemClock;
use crate::domain::foundation::Timestamp;
use crate::ports::{CacheError, CacheKey, CacheStats, CacheStore, Clock};

/// One stored value with its lifetime.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Timestamp,
    ttl_secs: u64,
}

impl CacheEntry {
    fn is_valid_at(&self, now: &Timestamp) -> bool {
        now.is_before(&self.stored_at.plus_secs(self.ttl_secs))
    }
}

/// In-memory implementation of the CacheStore port.
#[derive(Clone)]
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Drops every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_valid_at(&now));
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_valid_at(&now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| !e.is_valid_at(&now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), CacheError> {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            ttl_secs,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let now = self.clock.now();
        let entries = self.entries.read().await;

        let mut by_prefix: BTreeMap<String, u64> = BTreeMap::new();
        for (key, _) in entries.iter().filter(|(_, e)| e.is_valid_at(&now)) {
            *by_prefix.entry(CacheKey::prefix_of(key).to_string()).or_default() += 1;
        }

        Ok(CacheStats {
            backend: "memory".to_string(),
            total_entries: by_prefix.values().sum(),
            by_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::ports::CacheStoreExt;
    use serde_json::json;
    use std::time::Duration;

    fn store() -> (InMemoryCacheStore, ManualClock) {
        let clock = ManualClock::default();
        (InMemoryCacheStore::with_clock(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (cache, _) = store();
        cache.set("property:E1", json!({"score": 72}), 60).await.unwrap();
        assert_eq!(cache.get("property:E1").await.unwrap(), Some(json!({"score": 72})));
    }

    #[tokio::test]
    async fn entry_expires_after_ttl() {
        let (cache, clock) = store();
        cache.set("crime:E1", json!(1), 60).await.unwrap();

        clock.advance(Duration::from_secs(59));
        assert!(cache.get("crime:E1").await.unwrap().is_some());

        clock.advance(Duration::from_secs(1));
        assert!(cache.get("crime:E1").await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn overwrite_resets_lifetime() {
        let (cache, clock) = store();
        cache.set("k", json!("old"), 10).await.unwrap();
        clock.advance(Duration::from_secs(8));
        cache.set("k", json!("new"), 10).await.unwrap();
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get("k").await.unwrap(), Some(json!("new")));
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let (cache, _) = store();
        assert!(cache.delete("nothing").await.is_ok());
    }

    #[tokio::test]
    async fn invalidate_prefix_removes_only_matching_keys() {
        let (cache, _) = store();
        cache.set("recommendations:student:1", json!(1), 60).await.unwrap();
        cache.set("recommendations:parent:1", json!(2), 60).await.unwrap();
        cache.set("property:E1", json!(3), 60).await.unwrap();

        let removed = cache.invalidate_prefix("recommendations:").await.unwrap();

        assert_eq!(removed, 2);
        assert!(cache.get("property:E1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn purge_and_stats_ignore_expired_entries() {
        let (cache, clock) = store();
        cache.set("property:E1", json!(1), 10).await.unwrap();
        cache.set("property:E2", json!(1), 100).await.unwrap();
        cache.set("crime:E1", json!(1), 100).await.unwrap();
        clock.advance(Duration::from_secs(20));

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.by_prefix.get("property"), Some(&1));

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn typed_access_goes_through_serde() {
        #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Point {
            x: u32,
        }

        let (cache, _) = store();
        cache.set_json("p", &Point { x: 4 }, 60).await.unwrap();
        assert_eq!(cache.get_json::<Point>("p").await.unwrap(), Some(Point { x: 4 }));

        cache.set("bad", json!("not a point"), 60).await.unwrap();
        assert!(matches!(
            cache.get_json::<Point>("bad").await,
            Err(CacheError::Serialization(_))
        ));
    }
}
