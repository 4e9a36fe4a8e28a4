//! Video generation fallback chain.
//!
//! Tries providers in priority order until one renders the clip:
//!
//! ```text
//! Pending -> TryingProvider(0) -> { Success | TryingProvider(1) | AllFailed } ...
//! ```
//!
//! Each provider gets its own timeout and one retry for transient errors
//! before the chain moves on. Results are cached for 30 days under
//! `video:{area}:{persona}:{preferred provider}` and every success is
//! recorded with the cost tracker.
//!
//! # Example
//!
//! ```ignore
//! let chain = VideoGenerationChain::new(cache, cost_tracker)
//!     .with_provider(Arc::new(veo))
//!     .with_provider(Arc::new(nano))
//!     .with_event_callback(callback);
//!
//! let result = chain.generate(&request).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};

use crate::domain::foundation::{StateMachine, Timestamp, ValidationError};
use crate::domain::generation::{
    provider_order, GenerationRequest, GenerationResult, GenerationState, ProviderOutput,
    VideoProviderKind, VIDEO_TTL_SECS,
};
use crate::ports::{
    CacheKey, CacheStore, CacheStoreExt, CostRecord, CostSummary, CostTracker, CostTrackerError,
    GenerationError, VideoProvider,
};

use super::http_provider::DEFAULT_GENERATION_TIMEOUT;

/// Default pause before retrying the same provider.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Generation events for cost and failover monitoring.
pub mod events {
    use serde::{Deserialize, Serialize};

    use crate::domain::foundation::{AreaCode, Timestamp};
    use crate::domain::generation::VideoProviderKind;

    /// Emitted after every failed provider attempt, retried or not.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GenerationAttemptFailed {
        pub request_id: String,
        pub area_code: AreaCode,
        pub provider: VideoProviderKind,
        /// 1 for the first try, 2 for the retry.
        pub attempt: u32,
        pub error: String,
        pub retryable: bool,
        pub occurred_at: Timestamp,
    }

    /// Emitted when the chain gives up on one provider and moves to the next.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ProviderFallback {
        pub request_id: String,
        pub from_provider: VideoProviderKind,
        pub to_provider: VideoProviderKind,
        pub reason: String,
        pub occurred_at: Timestamp,
    }

    /// Emitted once per successful render.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GenerationSucceeded {
        pub request_id: String,
        pub area_code: AreaCode,
        pub provider: VideoProviderKind,
        pub cost_usd: f64,
        pub generation_time_seconds: f64,
        pub occurred_at: Timestamp,
    }
}

/// Observer for chain progress.
pub trait GenerationEventCallback: Send + Sync {
    fn on_attempt_failed(&self, event: events::GenerationAttemptFailed);

    fn on_fallback(&self, event: events::ProviderFallback);

    fn on_success(&self, event: events::GenerationSucceeded);
}

/// No-op event callback for when event tracking isn't needed.
#[derive(Debug, Clone, Copy)]
pub struct NoOpEventCallback;

impl GenerationEventCallback for NoOpEventCallback {
    fn on_attempt_failed(&self, _event: events::GenerationAttemptFailed) {}
    fn on_fallback(&self, _event: events::ProviderFallback) {}
    fn on_success(&self, _event: events::GenerationSucceeded) {}
}

/// Ordered, cached, cost-tracked access to every configured provider.
pub struct VideoGenerationChain {
    providers: HashMap<VideoProviderKind, Arc<dyn VideoProvider>>,
    base_order: Vec<VideoProviderKind>,
    cache: Arc<dyn CacheStore>,
    cost_tracker: Arc<dyn CostTracker>,
    event_callback: Arc<dyn GenerationEventCallback>,
    provider_timeout: Duration,
    retry_delay: Duration,
    ttl_secs: u64,
}

impl VideoGenerationChain {
    pub fn new(cache: Arc<dyn CacheStore>, cost_tracker: Arc<dyn CostTracker>) -> Self {
        Self {
            providers: HashMap::new(),
            base_order: VideoProviderKind::DEFAULT_ORDER.to_vec(),
            cache,
            cost_tracker,
            event_callback: Arc::new(NoOpEventCallback),
            provider_timeout: DEFAULT_GENERATION_TIMEOUT,
            retry_delay: DEFAULT_RETRY_DELAY,
            ttl_secs: VIDEO_TTL_SECS,
        }
    }

    /// Registers a provider under its own kind, replacing any previous one.
    pub fn with_provider(mut self, provider: Arc<dyn VideoProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Replaces the default priority list.
    pub fn with_order(mut self, order: Vec<VideoProviderKind>) -> Self {
        self.base_order = order;
        self
    }

    pub fn with_event_callback(mut self, callback: Arc<dyn GenerationEventCallback>) -> Self {
        self.event_callback = callback;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Registered providers in the order a request without preference would try them.
    pub fn configured_order(&self) -> Vec<VideoProviderKind> {
        self.base_order
            .iter()
            .copied()
            .filter(|kind| self.providers.contains_key(kind))
            .collect()
    }

    /// Runs the chain with the default order, preferred provider first.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let order = provider_order(request.preferred_provider, &self.base_order);
        self.generate_with_order(request, &order).await
    }

    /// Runs the chain over an explicit provider order.
    ///
    /// Kinds with no registered provider are skipped.
    pub async fn generate_with_order(
        &self,
        request: &GenerationRequest,
        order: &[VideoProviderKind],
    ) -> Result<GenerationResult, GenerationError> {
        let order: Vec<VideoProviderKind> = order
            .iter()
            .copied()
            .filter(|kind| {
                let known = self.providers.contains_key(kind);
                if !known {
                    tracing::debug!(provider = %kind, "Provider not configured, skipping");
                }
                known
            })
            .collect();

        let cache_provider = request
            .preferred_provider
            .or_else(|| order.first().copied())
            .unwrap_or(VideoProviderKind::DEFAULT_ORDER[0]);
        let key = CacheKey::video(request.area_code(), &request.persona, cache_provider);

        if let Some(cached) = self.read_cache(&key, request).await {
            tracing::debug!(area_code = %request.area_code(), key = %key, "Video cache hit");
            return Ok(cached);
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        let started = Instant::now();
        let mut state = step(GenerationState::new(order.len()).start())?;
        let mut last_error: Option<GenerationError> = None;

        while let Some(index) = state.current_index() {
            let kind = order[index];
            let provider = match self.providers.get(&kind) {
                Some(provider) => provider,
                None => {
                    state = step(state.advance())?;
                    continue;
                }
            };

            let duration_secs = kind.clamp_duration(request.duration_secs);
            match self.attempt_with_retry(provider.as_ref(), request, duration_secs, &request_id).await {
                Ok(output) => {
                    state = step(state.succeed())?;
                    debug_assert!(state.is_terminal());

                    let elapsed = started.elapsed().as_secs_f64();
                    let cost_usd = output
                        .cost_usd
                        .unwrap_or_else(|| kind.estimate_cost_usd(output.duration_secs));
                    let result = GenerationResult {
                        area_code: request.area_code().clone(),
                        persona: request.persona.clone(),
                        provider_used: kind,
                        artifact_url: output.artifact_url,
                        duration_secs: output.duration_secs,
                        cost_usd,
                        generation_time_seconds: elapsed,
                        created_at: Timestamp::now(),
                    };

                    self.finish(&key, &result, &request_id).await;
                    return Ok(result);
                }
                Err(err) => {
                    let next = step(state.advance())?;
                    if let Some(next_index) = next.current_index() {
                        tracing::warn!(
                            provider = %kind,
                            next_provider = %order[next_index],
                            area_code = %request.area_code(),
                            error = %err,
                            "Video provider failed, falling back"
                        );
                        self.event_callback.on_fallback(events::ProviderFallback {
                            request_id: request_id.clone(),
                            from_provider: kind,
                            to_provider: order[next_index],
                            reason: err.to_string(),
                            occurred_at: Timestamp::now(),
                        });
                    }
                    last_error = Some(err);
                    state = next;
                }
            }
        }

        let last_error = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no providers configured".to_string());
        tracing::error!(
            area_code = %request.area_code(),
            attempted = ?order,
            error = %last_error,
            "All video providers exhausted"
        );
        Err(GenerationError::AllProvidersExhausted {
            attempted: order,
            last_error,
        })
    }

    /// Spend to date across every provider.
    pub async fn cost_summary(&self) -> Result<CostSummary, CostTrackerError> {
        self.cost_tracker.summary().await
    }

    async fn read_cache(&self, key: &str, request: &GenerationRequest) -> Option<GenerationResult> {
        match self.cache.get_json::<GenerationResult>(key).await {
            Ok(Some(cached))
                if &cached.area_code == request.area_code() && cached.persona == request.persona =>
            {
                Some(cached)
            }
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Video cache read failed, treating as miss");
                None
            }
        }
    }

    async fn attempt_with_retry(
        &self,
        provider: &dyn VideoProvider,
        request: &GenerationRequest,
        duration_secs: u32,
        request_id: &str,
    ) -> Result<ProviderOutput, GenerationError> {
        let mut attempt = 1u32;
        loop {
            let outcome = match timeout(self.provider_timeout, provider.generate(request, duration_secs)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(GenerationError::Timeout {
                    timeout_secs: self.provider_timeout.as_secs(),
                }),
            };

            match outcome {
                Ok(output) => return Ok(output),
                Err(err) => {
                    let retryable = err.is_retryable();
                    self.event_callback.on_attempt_failed(events::GenerationAttemptFailed {
                        request_id: request_id.to_string(),
                        area_code: request.area_code().clone(),
                        provider: provider.kind(),
                        attempt,
                        error: err.to_string(),
                        retryable,
                        occurred_at: Timestamp::now(),
                    });

                    if !retryable || attempt >= 2 {
                        return Err(err);
                    }
                    tracing::debug!(provider = %provider.kind(), error = %err, "Retrying video provider");
                    if !self.retry_delay.is_zero() {
                        sleep(self.retry_delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn finish(&self, key: &str, result: &GenerationResult, request_id: &str) {
        if let Err(e) = self.cache.set_json(key, result, self.ttl_secs).await {
            tracing::warn!(key = %key, error = %e, "Video cache write failed");
        }
        if let Err(e) = self.cost_tracker.record(CostRecord::from(result)).await {
            tracing::warn!(provider = %result.provider_used, error = %e, "Failed to record generation cost");
        }

        tracing::info!(
            provider = %result.provider_used,
            area_code = %result.area_code,
            cost_usd = result.cost_usd,
            "Video generated"
        );
        self.event_callback.on_success(events::GenerationSucceeded {
            request_id: request_id.to_string(),
            area_code: result.area_code.clone(),
            provider: result.provider_used,
            cost_usd: result.cost_usd,
            generation_time_seconds: result.generation_time_seconds,
            occurred_at: result.created_at,
        });
    }
}

fn step(
    next: Result<GenerationState, ValidationError>,
) -> Result<GenerationState, GenerationError> {
    next.map_err(|e| GenerationError::InvalidState(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use crate::adapters::generation::{InMemoryCostTracker, MockError, MockVideoProvider};
    use crate::domain::foundation::{AreaCode, PersonaId};
    use crate::domain::scoring::{AreaFactors, Factor, PersonaCatalog, ScoringEngine};
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingCallback {
        failed: AtomicU32,
        fallbacks: AtomicU32,
        successes: AtomicU32,
    }

    impl GenerationEventCallback for CountingCallback {
        fn on_attempt_failed(&self, _event: events::GenerationAttemptFailed) {
            self.failed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_fallback(&self, _event: events::ProviderFallback) {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
        }

        fn on_success(&self, _event: events::GenerationSucceeded) {
            self.successes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn request(area: &str) -> GenerationRequest {
        let catalog = PersonaCatalog::builtin().unwrap();
        let persona = PersonaId::new("student").unwrap();
        let weights = catalog.get(&persona).unwrap();
        let factors = AreaFactors::from_scores(
            AreaCode::new(area).unwrap(),
            vec![(Factor::Affordability, 90.0), (Factor::Nightlife, 95.0)],
        );
        let item = ScoringEngine::rank(vec![factors], weights).remove(0);
        GenerationRequest::new(item, persona)
    }

    fn unavailable() -> MockError {
        MockError::Unavailable {
            message: "down".into(),
        }
    }

    struct Fixture {
        cache: Arc<InMemoryCacheStore>,
        costs: Arc<InMemoryCostTracker>,
        callback: Arc<CountingCallback>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                cache: Arc::new(InMemoryCacheStore::new()),
                costs: Arc::new(InMemoryCostTracker::new()),
                callback: Arc::new(CountingCallback::default()),
            }
        }

        fn chain(&self, providers: &[&MockVideoProvider]) -> VideoGenerationChain {
            let order = providers.iter().map(|p| p.kind()).collect();
            providers
                .iter()
                .fold(
                    VideoGenerationChain::new(self.cache.clone(), self.costs.clone()),
                    |chain, p| chain.with_provider(Arc::new((*p).clone())),
                )
                .with_order(order)
                .with_event_callback(self.callback.clone())
                .with_retry_delay(Duration::ZERO)
                .with_provider_timeout(Duration::from_millis(200))
        }
    }

    #[tokio::test]
    async fn first_failure_falls_back_and_third_is_never_called() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo).with_errors(unavailable(), 2);
        let b = MockVideoProvider::new(VideoProviderKind::Sora).with_success("https://cdn/b.mp4");
        let c = MockVideoProvider::new(VideoProviderKind::Ltx).with_success("https://cdn/c.mp4");

        let result = fx.chain(&[&a, &b, &c]).generate(&request("E2")).await.unwrap();

        assert_eq!(result.provider_used, VideoProviderKind::Sora);
        assert_eq!(result.artifact_url, "https://cdn/b.mp4");
        assert_eq!(a.call_count(), 2);
        assert_eq!(b.call_count(), 1);
        assert_eq!(c.call_count(), 0);
        assert_eq!(fx.callback.failed.load(Ordering::SeqCst), 2);
        assert_eq!(fx.callback.fallbacks.load(Ordering::SeqCst), 1);
        assert_eq!(fx.callback.successes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_error_is_retried_on_same_provider() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo)
            .with_error(MockError::RateLimited {
                retry_after_secs: 1,
            })
            .with_success("https://cdn/a.mp4");
        let b = MockVideoProvider::new(VideoProviderKind::Sora);

        let result = fx.chain(&[&a, &b]).generate(&request("E2")).await.unwrap();

        assert_eq!(result.provider_used, VideoProviderKind::Veo);
        assert_eq!(a.call_count(), 2);
        assert_eq!(b.call_count(), 0);
    }

    #[tokio::test]
    async fn permanent_error_moves_on_without_retry() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo).with_error(MockError::AuthenticationFailed);
        let b = MockVideoProvider::new(VideoProviderKind::Sora).with_success("https://cdn/b.mp4");

        let result = fx.chain(&[&a, &b]).generate(&request("E2")).await.unwrap();

        assert_eq!(result.provider_used, VideoProviderKind::Sora);
        assert_eq!(a.call_count(), 1);
    }

    #[tokio::test]
    async fn exhaustion_is_terminal_and_caches_nothing() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo).with_errors(unavailable(), 2);
        let b = MockVideoProvider::new(VideoProviderKind::Sora).with_error(MockError::InvalidRequest {
            message: "bad prompt".into(),
        });

        let err = fx.chain(&[&a, &b]).generate(&request("E2")).await.unwrap_err();

        match err {
            GenerationError::AllProvidersExhausted {
                attempted,
                last_error,
            } => {
                assert_eq!(attempted, vec![VideoProviderKind::Veo, VideoProviderKind::Sora]);
                assert!(last_error.contains("bad prompt"));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert!(fx.cache.is_empty().await);
        assert!(fx.costs.is_empty());
        assert_eq!(fx.callback.successes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cached_result_skips_providers() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo);
        let chain = fx.chain(&[&a]);

        let first = chain.generate(&request("E2")).await.unwrap();
        let second = chain.generate(&request("E2")).await.unwrap();

        assert_eq!(first.artifact_url, second.artifact_url);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(a.call_count(), 1);
        assert_eq!(fx.costs.len(), 1);
    }

    #[tokio::test]
    async fn other_area_never_reuses_cached_artifact() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo);
        let chain = fx.chain(&[&a]);

        chain.generate(&request("E2")).await.unwrap();
        let other = chain.generate(&request("N1")).await.unwrap();

        assert_eq!(other.area_code.as_str(), "N1");
        assert_eq!(a.call_count(), 2);
    }

    #[tokio::test]
    async fn slow_provider_times_out_and_falls_back() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo).with_delay(Duration::from_secs(5));
        let b = MockVideoProvider::new(VideoProviderKind::Sora).with_success("https://cdn/b.mp4");

        let result = fx
            .chain(&[&a, &b])
            .with_provider_timeout(Duration::from_millis(20))
            .generate(&request("E2"))
            .await
            .unwrap();

        assert_eq!(result.provider_used, VideoProviderKind::Sora);
        assert_eq!(a.call_count(), 2);
    }

    #[tokio::test]
    async fn preferred_provider_goes_first() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo);
        let b = MockVideoProvider::new(VideoProviderKind::Nano);

        let result = fx
            .chain(&[&a, &b])
            .generate(&request("E2").with_preferred_provider(VideoProviderKind::Nano))
            .await
            .unwrap();

        assert_eq!(result.provider_used, VideoProviderKind::Nano);
        assert_eq!(a.call_count(), 0);
    }

    #[tokio::test]
    async fn duration_is_clamped_and_cost_estimated() {
        let fx = Fixture::new();
        let nano = MockVideoProvider::new(VideoProviderKind::Nano);

        let result = fx
            .chain(&[&nano])
            .generate(&request("E2").with_duration(45))
            .await
            .unwrap();

        assert_eq!(nano.get_calls()[0].duration_secs, 30);
        assert_eq!(result.duration_secs, 30);
        assert!((result.cost_usd - VideoProviderKind::Nano.estimate_cost_usd(30)).abs() < 1e-9);

        let summary = fx.costs.summary().await.unwrap();
        assert_eq!(summary.generations, 1);
        assert!((summary.total_usd - result.cost_usd).abs() < 1e-9);
    }

    #[tokio::test]
    async fn reported_cost_wins_over_estimate() {
        let fx = Fixture::new();
        let a = MockVideoProvider::new(VideoProviderKind::Veo).with_success_costing("https://cdn/a.mp4", Some(2.25));

        let result = fx.chain(&[&a]).generate(&request("E2")).await.unwrap();

        assert_eq!(result.cost_usd, 2.25);
    }

    #[tokio::test]
    async fn no_configured_providers_is_exhaustion() {
        let fx = Fixture::new();
        let chain = VideoGenerationChain::new(fx.cache.clone(), fx.costs.clone());

        let err = chain.generate(&request("E2")).await.unwrap_err();

        assert!(matches!(
            err,
            GenerationError::AllProvidersExhausted { ref attempted, .. } if attempted.is_empty()
        ));
    }
}
