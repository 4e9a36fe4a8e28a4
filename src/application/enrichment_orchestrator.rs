//! Enrichment Orchestrator - fans one area out to every source adapter.
//!
//! All adapters run concurrently and no failure cancels a sibling. Optional
//! sources are abandoned once the request deadline passes; the critical
//! source is always awaited, bounded only by its own adapter timeout.
//!
//! When a cache probe is configured, an area whose critical-source entry is
//! already cached runs under the shorter cached-path deadline. Callers that
//! enrich many areas for one request pass a shared deadline through
//! [`EnrichmentOrchestrator::enrich_until`].

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

use crate::domain::enrichment::{EnrichmentOutcome, EnrichmentRecord, SourceKind, SourceResult};
use crate::domain::foundation::AreaCode;
use crate::ports::{CacheKey, CacheStore, SourceAdapter, SourceRequest};

/// Default request-level deadline for optional sources.
pub const DEFAULT_ENRICHMENT_DEADLINE: Duration = Duration::from_secs(30);

/// Default deadline when the area's critical data is already cached.
pub const DEFAULT_CACHED_DEADLINE: Duration = Duration::from_secs(10);

/// Concurrent fetch of every configured source for one area.
pub struct EnrichmentOrchestrator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    deadline: Duration,
    cached_path: Option<(Arc<dyn CacheStore>, Duration)>,
}

impl EnrichmentOrchestrator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            adapters,
            deadline: DEFAULT_ENRICHMENT_DEADLINE,
            cached_path: None,
        }
    }

    /// Cold-path deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Probes `cache` for the critical source before fanning out and uses
    /// `deadline` instead of the cold-path one on a hit.
    pub fn with_cached_path(mut self, cache: Arc<dyn CacheStore>, deadline: Duration) -> Self {
        self.cached_path = Some((cache, deadline));
        self
    }

    /// Sources this orchestrator will ask, in enrichment order.
    pub fn configured_sources(&self) -> Vec<SourceKind> {
        let mut kinds: Vec<SourceKind> = self.adapters.iter().map(|a| a.kind()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    pub fn source_count(&self) -> usize {
        self.adapters.len()
    }

    /// Cold-path deadline.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Enriches one area.
    ///
    /// The record always has one entry per configured source. Optional
    /// sources still pending at the deadline are recorded as timeouts.
    pub async fn enrich(&self, area_code: AreaCode, destination: Option<String>) -> EnrichmentOutcome {
        let deadline = Instant::now() + self.deadline;
        self.enrich_until(area_code, destination, deadline).await
    }

    /// Enriches one area against a deadline shared with the rest of its
    /// request. The cached-path deadline can only bring it forward.
    pub async fn enrich_until(
        &self,
        area_code: AreaCode,
        destination: Option<String>,
        deadline: Instant,
    ) -> EnrichmentOutcome {
        let mut request = SourceRequest::new(area_code.clone());
        if let Some(dest) = destination.as_deref() {
            request = request.with_destination(dest);
        }

        let deadline = deadline.min(Instant::now() + self.deadline_for(&area_code).await);
        let (critical, optional): (Vec<_>, Vec<_>) =
            self.adapters.iter().partition(|a| a.kind().is_critical());

        let critical_fut = join_all(critical.iter().map(|adapter| adapter.fetch(&request)));
        let optional_fut = join_all(optional.iter().map(|adapter| {
            let request = &request;
            async move {
                match timeout_at(deadline, adapter.fetch(request)).await {
                    Ok(result) => Some(result),
                    Err(_) => {
                        tracing::warn!(
                            source = %adapter.kind(),
                            area_code = %request.area_code,
                            "Source abandoned at enrichment deadline"
                        );
                        None
                    }
                }
            }
        }));

        let (critical_results, optional_results) = tokio::join!(critical_fut, optional_fut);

        let results: Vec<SourceResult> = critical_results
            .into_iter()
            .chain(optional_results.into_iter().flatten())
            .collect();

        let record = EnrichmentRecord::assemble(
            area_code,
            request.destination.clone(),
            &self.configured_sources(),
            results,
        );

        let outcome = EnrichmentOutcome::from_record(record);
        if outcome.is_excluded() {
            tracing::info!(
                area_code = %outcome.record().area_code,
                "Critical source unavailable, area excluded"
            );
        }
        outcome
    }

    async fn deadline_for(&self, area_code: &AreaCode) -> Duration {
        let Some((cache, cached_deadline)) = &self.cached_path else {
            return self.deadline;
        };
        let key = CacheKey::source(SourceKind::Property, area_code, None);
        match cache.get(&key).await {
            Ok(Some(_)) => (*cached_deadline).min(self.deadline),
            _ => self.deadline,
        }
    }
}
