//! Application layer - the enrichment orchestrator and request handlers.
//!
//! Handlers hold only `Arc`s to ports and the orchestrator; no state is
//! shared across requests beyond the cache store.

mod enrichment_orchestrator;
pub mod handlers;

pub use enrichment_orchestrator::{
    EnrichmentOrchestrator, DEFAULT_CACHED_DEADLINE, DEFAULT_ENRICHMENT_DEADLINE,
};
pub use handlers::{
    CacheAdminHandler, CacheWarmer, FilteredSummary, GenerateVideoCommand, GenerateVideoError,
    GenerateVideoHandler, GetAreaProfileHandler, GetAreaProfileQuery, GetRecommendationsHandler,
    GetRecommendationsQuery, RecommendationError, RecommendationMetadata, RecommendationResponse,
    RecommendationSettings, WarmReport,
};
