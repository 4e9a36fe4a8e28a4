//! CacheAdminHandler - cache statistics and prefix invalidation.

use std::sync::Arc;

use crate::ports::{CacheError, CacheStats, CacheStore};

/// Handler for cache maintenance.
pub struct CacheAdminHandler {
    cache: Arc<dyn CacheStore>,
}

impl CacheAdminHandler {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        self.cache.stats().await
    }

    /// Removes every key under `prefix`; an empty prefix flushes everything.
    pub async fn invalidate(&self, prefix: &str) -> Result<u64, CacheError> {
        let removed = self.cache.invalidate_prefix(prefix).await?;
        tracing::info!(prefix = %prefix, removed, "Cache invalidated");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use serde_json::json;

    #[tokio::test]
    async fn invalidation_is_scoped_to_prefix() {
        let cache = Arc::new(InMemoryCacheStore::new());
        cache.set("property:E1", json!(1), 60).await.unwrap();
        cache.set("property:N1", json!(2), 60).await.unwrap();
        cache.set("crime:E1", json!(3), 60).await.unwrap();
        let admin = CacheAdminHandler::new(cache);

        assert_eq!(admin.invalidate("property:").await.unwrap(), 2);

        let stats = admin.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.by_prefix.get("crime"), Some(&1));
    }

    #[tokio::test]
    async fn empty_prefix_flushes_everything() {
        let cache = Arc::new(InMemoryCacheStore::new());
        cache.set("a:1", json!(1), 60).await.unwrap();
        cache.set("b:1", json!(1), 60).await.unwrap();
        let admin = CacheAdminHandler::new(cache);

        assert_eq!(admin.invalidate("").await.unwrap(), 2);
    }
}
