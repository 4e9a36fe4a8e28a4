//! Cache Store Port - Key/value storage with per-entry time-to-live.
//!
//! Every component that remembers anything across requests goes through this
//! port. Values are JSON documents; `CacheStoreExt` adds typed access.
//!
//! # Semantics
//!
//! - An entry is valid iff `now < stored_at + ttl`; expired entries read as absent
//! - Last writer wins on concurrent `set` to the same key
//! - Keys are colon-delimited with one prefix per data kind (see [`CacheKey`]),
//!   so prefix-scoped invalidation never needs to parse values

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::domain::enrichment::SourceKind;
use crate::domain::foundation::{AreaCode, PersonaId};
use crate::domain::generation::VideoProviderKind;
use crate::domain::scoring::LocationType;

/// Errors from cache backends.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    /// Backend could not be reached or rejected the command.
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    /// Value could not be encoded or decoded.
    #[error("cache serialization error: {0}")]
    Serialization(String),
}

/// Live entry counts, total and per key prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub backend: String,
    pub total_entries: u64,
    pub by_prefix: BTreeMap<String, u64>,
}

/// Port for the shared cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the value if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores a value, replacing any previous entry.
    async fn set(&self, key: &str, value: Value, ttl_secs: u64) -> Result<(), CacheError>;

    /// Removes a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Removes every key starting with `prefix`, returning how many went.
    async fn invalidate_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Live entry counts.
    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

/// Typed access on top of [`CacheStore`].
#[async_trait]
pub trait CacheStoreExt: CacheStore {
    async fn get_json<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned + Send,
    {
        match self.get(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_json<T>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        let value =
            serde_json::to_value(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.set(key, value, ttl_secs).await
    }
}

#[async_trait]
impl<C: CacheStore + ?Sized> CacheStoreExt for C {}

/// Builders for every key the service writes.
pub struct CacheKey;

impl CacheKey {
    pub const RECOMMENDATIONS_PREFIX: &'static str = "recommendations:";
    pub const VIDEO_PREFIX: &'static str = "video:";

    /// `{source}:{area}`, or `commute:{area}:{destination}` for the commute source.
    pub fn source(kind: SourceKind, area: &AreaCode, destination: Option<&str>) -> String {
        match (kind, destination) {
            (SourceKind::Commute, Some(dest)) => {
                format!("commute:{}:{}", area, normalise_segment(dest))
            }
            _ => format!("{}:{}", kind.name(), area),
        }
    }

    /// `recommendations:{persona}:{budget}:{locationType}:{dest}` with an
    /// optional digest of any further request fields.
    ///
    /// `extras` is hashed in its canonical JSON form; object keys serialise in
    /// sorted order, so two requests differing only in field order share a key.
    pub fn recommendations(
        persona: &PersonaId,
        budget: f64,
        location_type: LocationType,
        destination: &str,
        extras: Option<&Value>,
    ) -> String {
        let base = format!(
            "{}{}:{}:{}:{}",
            Self::RECOMMENDATIONS_PREFIX,
            persona,
            budget,
            location_type,
            normalise_segment(destination)
        );
        match extras {
            Some(extras) if !is_empty_json(extras) => format!("{}:{}", base, digest(extras)),
            _ => base,
        }
    }

    /// `video:{area}:{persona}:{provider}`.
    pub fn video(area: &AreaCode, persona: &PersonaId, provider: VideoProviderKind) -> String {
        format!("{}{}:{}:{}", Self::VIDEO_PREFIX, area, persona, provider)
    }

    /// The data-kind prefix of a key (`"property"` for `"property:E1"`).
    pub fn prefix_of(key: &str) -> &str {
        key.split(':').next().unwrap_or(key)
    }
}

fn normalise_segment(segment: &str) -> String {
    segment.trim().to_ascii_uppercase().replace(':', "_")
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.values().all(is_empty_json),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn digest(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..16].to_string()
}
