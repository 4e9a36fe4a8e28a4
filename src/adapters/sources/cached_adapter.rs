//! Cache-backed source adapter.
//!
//! Wraps a `SourceProvider` with read-through caching, a per-attempt
//! deadline and a single retry for transient failures. Whatever happens, the
//! caller gets a `SourceResult`; errors never escape.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::domain::enrichment::{SourceData, SourceErrorKind, SourceKind, SourceResult};
use crate::ports::{
    CacheKey, CacheStore, CacheStoreExt, SourceAdapter, SourceError, SourceProvider, SourceRequest,
};

/// Default per-attempt deadline.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay before the first retry; doubles per attempt.
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// `SourceAdapter` over any provider and cache store.
pub struct CachedSourceAdapter {
    provider: Arc<dyn SourceProvider>,
    cache: Arc<dyn CacheStore>,
    ttl_secs: u64,
    timeout: Duration,
    retry_base_delay: Duration,
    max_retries: u32,
}

impl CachedSourceAdapter {
    /// Creates an adapter using the source's default TTL.
    pub fn new(provider: Arc<dyn SourceProvider>, cache: Arc<dyn CacheStore>) -> Self {
        let ttl_secs = provider.kind().default_ttl_secs();
        Self {
            provider,
            cache,
            ttl_secs,
            timeout: DEFAULT_SOURCE_TIMEOUT,
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
            max_retries: 1,
        }
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    async fn attempt(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        match timeout(self.timeout, self.provider.fetch(request)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::timeout(format!(
                "no response within {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    async fn fetch_with_retry(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let mut attempt = 0u32;
        loop {
            match self.attempt(request).await {
                Ok(data) => return Ok(data),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.retry_base_delay * (1u32 << attempt.min(16));
                    tracing::debug!(
                        source = %self.provider.kind(),
                        area = %request.area_code,
                        attempt = attempt + 1,
                        error = %err,
                        "Retrying source fetch"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn read_cache(&self, key: &str, kind: SourceKind) -> Option<SourceData> {
        match self.cache.get_json::<SourceData>(key).await {
            Ok(Some(data)) if data.kind() == kind => Some(data),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for CachedSourceAdapter {
    fn kind(&self) -> SourceKind {
        self.provider.kind()
    }

    async fn fetch(&self, request: &SourceRequest) -> SourceResult {
        let kind = self.provider.kind();

        if self.provider.requires_destination() && request.destination.is_none() {
            return SourceResult::failed(kind, SourceErrorKind::Skipped);
        }

        let key = CacheKey::source(kind, &request.area_code, request.destination.as_deref());
        if let Some(data) = self.read_cache(&key, kind).await {
            tracing::debug!(source = %kind, area = %request.area_code, "Source cache hit");
            return SourceResult::cached(data);
        }

        match self.fetch_with_retry(request).await {
            Ok(data) => {
                if let Err(e) = self.cache.set_json(&key, &data, self.ttl_secs).await {
                    tracing::warn!(key = %key, error = %e, "Cache write failed");
                }
                SourceResult::fresh(data)
            }
            Err(err) => {
                tracing::warn!(
                    source = %kind,
                    area = %request.area_code,
                    error = %err,
                    "Source fetch failed"
                );
                SourceResult::failed(kind, err.kind)
            }
        }
    }
}
