//! Area Scout API server entry point
//!
//! Loads configuration, wires sources, cache, scoring and the video chain,
//! then serves the Axum router until ctrl-c.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use area_scout::adapters::cache::{InMemoryCacheStore, RedisCacheStore};
use area_scout::adapters::generation::{
    HttpVideoProvider, HttpVideoProviderConfig, InMemoryCostTracker, VideoGenerationChain,
};
use area_scout::adapters::http::{api_router, AppState};
use area_scout::adapters::sources::{
    AmenitiesSource, CachedSourceAdapter, CommuteSource, CrimeSource, GeographySource,
    HttpSourceConfig, PropertySource, ResearchSource, SchoolsSource,
};
use area_scout::application::{
    CacheAdminHandler, CacheWarmer, EnrichmentOrchestrator, GenerateVideoHandler,
    GetAreaProfileHandler, GetRecommendationsHandler, RecommendationSettings,
};
use area_scout::config::{
    AppConfig, CacheBackend, CacheConfig, ConfigError, GenerationConfig, ServerConfig,
    SourcesConfig, ValidationError,
};
use area_scout::domain::enrichment::SourceKind;
use area_scout::domain::scoring::PersonaError;
use area_scout::ports::{CacheError, CacheStore, SourceAdapter, SourceProvider};

const PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("persona catalog: {0}")]
    Personas(#[from] PersonaError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("invalid bind address: {0}")]
    BindAddress(#[from] std::net::AddrParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    let cache = build_cache(&config.cache).await?;
    let catalog = Arc::new(config.scoring.load_catalog()?);

    let adapters = build_sources(&config.sources, &cache);
    let source_count = adapters.len();
    let orchestrator = Arc::new(
        EnrichmentOrchestrator::new(adapters)
            .with_deadline(config.enrichment.cold_deadline())
            .with_cached_path(cache.clone(), config.enrichment.cached_deadline()),
    );

    let chain = Arc::new(build_chain(&config.generation, &cache)?);

    let settings = RecommendationSettings {
        max_candidates: config.enrichment.max_candidates,
        area_concurrency: config.enrichment.area_concurrency(source_count),
        default_max_areas: config.enrichment.default_max_areas,
        default_destination: config.enrichment.default_destination.clone(),
        response_ttl_secs: config.cache.recommendation_ttl_secs,
        ..Default::default()
    };

    let state = AppState::new(
        Arc::new(
            GetRecommendationsHandler::new(orchestrator.clone(), catalog.clone(), cache.clone())
                .with_settings(settings),
        ),
        Arc::new(GetAreaProfileHandler::new(orchestrator.clone())),
        Arc::new(GenerateVideoHandler::new(orchestrator.clone(), catalog, chain)),
        Arc::new(CacheAdminHandler::new(cache)),
    );

    if config.cache.warm_enabled {
        let warmer = CacheWarmer::new(
            orchestrator,
            config.cache.warm_areas_list()?,
            config.cache.warm_interval(),
        )
        .with_destination(config.enrichment.default_destination.clone());
        tokio::spawn(warmer.run());
    }

    let app = api_router()
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, sources = source_count, "Starting area-scout server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(config: &ServerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json_logs() {
        builder.json().init();
    } else {
        builder.pretty().init();
    }
}

async fn build_cache(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, StartupError> {
    match config.backend {
        CacheBackend::Redis => {
            let url = config.redis_url.as_deref().unwrap_or_default();
            let store = RedisCacheStore::connect(url).await?;
            tracing::info!("Using Redis cache");
            Ok(Arc::new(store))
        }
        CacheBackend::Memory => {
            let store = Arc::new(InMemoryCacheStore::new());
            let purged = store.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(PURGE_INTERVAL);
                loop {
                    ticker.tick().await;
                    let removed = purged.purge_expired().await;
                    if removed > 0 {
                        tracing::debug!(removed, "Purged expired cache entries");
                    }
                }
            });
            tracing::info!("Using in-memory cache");
            Ok(store)
        }
    }
}

fn build_sources(config: &SourcesConfig, cache: &Arc<dyn CacheStore>) -> Vec<Arc<dyn SourceAdapter>> {
    config
        .enabled_kinds()
        .into_iter()
        .map(|kind| {
            let adapter = CachedSourceAdapter::new(source_provider(kind, config), cache.clone())
                .with_timeout(config.timeout(kind))
                .with_ttl_secs(config.ttl_secs(kind));
            Arc::new(adapter) as Arc<dyn SourceAdapter>
        })
        .collect()
}

fn source_provider(kind: SourceKind, config: &SourcesConfig) -> Arc<dyn SourceProvider> {
    let mut http = HttpSourceConfig::new(config.base_url(kind)).with_timeout(config.timeout(kind));
    if let Some(key) = config.settings(kind).api_key.clone() {
        http = http.with_api_key(key);
    }

    match kind {
        SourceKind::Property => Arc::new(PropertySource::new(http)),
        SourceKind::Commute => Arc::new(CommuteSource::new(http)),
        SourceKind::Crime => Arc::new(CrimeSource::new(http)),
        SourceKind::Schools => Arc::new(SchoolsSource::new(http)),
        SourceKind::Amenities => Arc::new(AmenitiesSource::new(http)),
        SourceKind::Geography => Arc::new(GeographySource::new(http)),
        SourceKind::Research => {
            let source = ResearchSource::new(http);
            match &config.research_model {
                Some(model) => Arc::new(source.with_model(model.clone())),
                None => Arc::new(source),
            }
        }
    }
}

fn build_chain(
    config: &GenerationConfig,
    cache: &Arc<dyn CacheStore>,
) -> Result<VideoGenerationChain, ValidationError> {
    let order = config.provider_order_list()?;
    let mut chain = VideoGenerationChain::new(cache.clone(), Arc::new(InMemoryCostTracker::new()))
        .with_order(order.clone())
        .with_provider_timeout(config.timeout())
        .with_retry_delay(config.retry_delay())
        .with_ttl_secs(config.ttl_secs);

    for kind in order {
        match config.settings(kind).api_key.clone() {
            Some(key) => {
                let provider_config = HttpVideoProviderConfig::new(kind, key, config.base_url(kind))
                    .with_timeout(config.timeout());
                chain = chain.with_provider(Arc::new(HttpVideoProvider::new(provider_config)));
            }
            None => tracing::info!(provider = %kind, "Video provider has no API key, skipped"),
        }
    }
    tracing::info!(providers = ?chain.configured_order(), "Video generation chain ready");
    Ok(chain)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
