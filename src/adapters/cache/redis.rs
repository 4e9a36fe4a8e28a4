//! Redis-backed cache store for multi-server deployments.
//!
//! Values are stored as JSON strings with `SET key value EX ttl`; expiry is
//! left to Redis. Prefix invalidation walks the keyspace with `SCAN` so it
//! never blocks the server the way `KEYS` would.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::ports::{CacheError, CacheKey, CacheStats, CacheStore};

/// Keys fetched per `SCAN` round trip.
const SCAN_BATCH: usize = 100;

/// Redis implementation of the CacheStore port.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: MultiplexedConnection,
}

impl RedisCacheStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    /// Every key matching `pattern`, collected across SCAN pages.
    async fn scan(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;

        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }

    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), CacheError> {
        if ttl_secs == 0 {
            return self.delete(key).await;
        }

        let payload =
            serde_json::to_string(&value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))
    }

    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let keys = self.scan(&format!("{}*", escape_glob(prefix))).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let mut removed: u64 = 0;
        for chunk in keys.chunks(SCAN_BATCH) {
            let count: u64 = conn
                .del(chunk)
                .await
                .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
            removed += count;
        }
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let keys = self.scan("*").await?;

        let mut by_prefix: BTreeMap<String, u64> = BTreeMap::new();
        for key in &keys {
            *by_prefix.entry(CacheKey::prefix_of(key).to_string()).or_default() += 1;
        }

        Ok(CacheStats {
            backend: "redis".to_string(),
            total_entries: keys.len() as u64,
            by_prefix,
        })
    }
}

impl std::fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheStore").finish_non_exhaustive()
    }
}

/// Escapes Redis glob metacharacters so a prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
