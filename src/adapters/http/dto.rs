//! HTTP DTOs for the area-scout API.
//!
//! Request bodies carry raw strings; conversion into application queries
//! validates every identifier so handlers only ever see typed values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::application::{GenerateVideoCommand, GetRecommendationsQuery};
use crate::domain::enrichment::{EnrichmentOutcome, EnrichmentRecord, SourceKind};
use crate::domain::foundation::{AreaCode, PersonaId, ValidationError};
use crate::domain::generation::VideoProviderKind;
use crate::domain::scoring::{Factor, HardConstraints, ImportanceRatings, LocationType};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/recommendations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub persona: String,
    pub budget: f64,
    #[serde(default)]
    pub location_type: LocationType,
    pub destination: Option<String>,
    pub max_areas: Option<usize>,
    /// Factor name to 0-10 rating
    pub importance: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub constraints: HardConstraints,
    pub candidates: Option<Vec<String>>,
}

impl TryFrom<RecommendationRequest> for GetRecommendationsQuery {
    type Error = ValidationError;

    fn try_from(req: RecommendationRequest) -> Result<Self, Self::Error> {
        let mut query =
            GetRecommendationsQuery::new(PersonaId::new(&req.persona)?, req.budget, req.location_type);
        query.destination = req.destination;
        query.max_areas = req.max_areas;
        query.constraints = req.constraints;

        if let Some(importance) = req.importance {
            let mut ratings = ImportanceRatings::new();
            for (name, rating) in importance {
                ratings.insert(name.parse::<Factor>()?, rating);
            }
            query.importance = Some(ratings);
        }

        if let Some(candidates) = req.candidates {
            query.candidates = Some(
                candidates
                    .iter()
                    .map(AreaCode::new)
                    .collect::<Result<Vec<_>, _>>()?,
            );
        }

        Ok(query)
    }
}

/// Query string of `GET /api/areas/:code`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaProfileParams {
    pub destination: Option<String>,
}

/// Body of `POST /api/videos`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub area_code: String,
    pub persona: String,
    pub preferred_provider: Option<String>,
    pub duration_seconds: Option<u32>,
    pub destination: Option<String>,
}

impl TryFrom<VideoRequest> for GenerateVideoCommand {
    type Error = ValidationError;

    fn try_from(req: VideoRequest) -> Result<Self, Self::Error> {
        let preferred_provider = req
            .preferred_provider
            .as_deref()
            .map(str::parse::<VideoProviderKind>)
            .transpose()?;
        Ok(GenerateVideoCommand {
            area_code: AreaCode::new(&req.area_code)?,
            persona: PersonaId::new(&req.persona)?,
            preferred_provider,
            duration_secs: req.duration_seconds,
            destination: req.destination,
        })
    }
}

/// Body of `POST /api/cache/invalidate`.
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Key prefix; empty flushes everything
    #[serde(default)]
    pub prefix: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Enrichment record for one area.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaProfileResponse {
    pub area_code: AreaCode,
    /// True when the critical source is missing
    pub excluded: bool,
    pub available_sources: Vec<SourceKind>,
    pub record: EnrichmentRecord,
}

impl From<EnrichmentOutcome> for AreaProfileResponse {
    fn from(outcome: EnrichmentOutcome) -> Self {
        let excluded = outcome.is_excluded();
        let record = outcome.into_record();
        Self {
            area_code: record.area_code.clone(),
            excluded,
            available_sources: record.available_sources().collect(),
            record,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub prefix: String,
    pub removed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
