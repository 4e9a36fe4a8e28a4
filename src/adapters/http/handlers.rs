//! HTTP handlers for the area-scout API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::application::{
    CacheAdminHandler, GenerateVideoCommand, GenerateVideoHandler, GetAreaProfileHandler,
    GetAreaProfileQuery, GetRecommendationsHandler, GetRecommendationsQuery,
};
use crate::domain::foundation::AreaCode;

use super::dto::{
    AreaProfileParams, AreaProfileResponse, HealthResponse, InvalidateRequest,
    InvalidateResponse, RecommendationRequest, VideoRequest,
};
use super::error::ApiError;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Shared application state for the API router.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<GetRecommendationsHandler>,
    pub area_profile: Arc<GetAreaProfileHandler>,
    pub videos: Arc<GenerateVideoHandler>,
    pub cache_admin: Arc<CacheAdminHandler>,
}

impl AppState {
    pub fn new(
        recommendations: Arc<GetRecommendationsHandler>,
        area_profile: Arc<GetAreaProfileHandler>,
        videos: Arc<GenerateVideoHandler>,
        cache_admin: Arc<CacheAdminHandler>,
    ) -> Self {
        Self {
            recommendations,
            area_profile,
            videos,
            cache_admin,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/recommendations - Ranked areas for a persona
pub async fn get_recommendations(
    State(state): State<AppState>,
    Json(req): Json<RecommendationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetRecommendationsQuery::try_from(req)?;
    let response = state.recommendations.handle(query).await?;
    Ok(Json(response))
}

/// GET /api/areas/:code - Enrichment record for one area
pub async fn get_area_profile(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<AreaProfileParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetAreaProfileQuery {
        area_code: AreaCode::new(&code)?,
        destination: params.destination,
    };
    let outcome = state.area_profile.handle(query).await;
    Ok(Json(AreaProfileResponse::from(outcome)))
}

/// POST /api/videos - Generate an area video through the provider chain
pub async fn generate_video(
    State(state): State<AppState>,
    Json(req): Json<VideoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cmd = GenerateVideoCommand::try_from(req)?;
    let result = state.videos.handle(cmd).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/cache/stats - Live entries per key prefix
pub async fn cache_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.cache_admin.stats().await?;
    Ok(Json(stats))
}

/// POST /api/cache/invalidate - Drop every key under a prefix
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.cache_admin.invalidate(&req.prefix).await?;
    Ok(Json(InvalidateResponse {
        prefix: req.prefix,
        removed,
    }))
}

/// GET /health - Liveness
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::default())
}
