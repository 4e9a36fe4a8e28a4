//! Route configuration for the area-scout API.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    cache_stats, generate_video, get_area_profile, get_recommendations, health,
    invalidate_cache, AppState,
};

/// Creates the API router with all endpoints.
///
/// Routes:
/// - `POST /api/recommendations` - Ranked areas for a persona
/// - `GET /api/areas/:code?destination=` - Enrichment record for one area
/// - `POST /api/videos` - Area video through the provider fallback chain
/// - `GET /api/cache/stats` - Cache statistics
/// - `POST /api/cache/invalidate` - Prefix invalidation
/// - `GET /health` - Liveness
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/recommendations", post(get_recommendations))
        .route("/api/areas/:code", get(get_area_profile))
        .route("/api/videos", post(generate_video))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/cache/invalidate", post(invalidate_cache))
        .route("/health", get(health))
}
