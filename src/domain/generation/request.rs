//! Generation request and result types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AreaCode, PersonaId, Timestamp};
use crate::domain::scoring::RecommendationItem;

use super::VideoProviderKind;

/// Target clip length when the caller does not ask for one.
pub const DEFAULT_DURATION_SECS: u32 = 30;

/// Generated artifacts are cached for 30 days.
pub const VIDEO_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// A request to render a video for one ranked area.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub item: RecommendationItem,
    pub persona: PersonaId,
    pub duration_secs: u32,
    pub preferred_provider: Option<VideoProviderKind>,
}

impl GenerationRequest {
    pub fn new(item: RecommendationItem, persona: PersonaId) -> Self {
        Self {
            item,
            persona,
            duration_secs: DEFAULT_DURATION_SECS,
            preferred_provider: None,
        }
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    pub fn with_preferred_provider(mut self, provider: VideoProviderKind) -> Self {
        self.preferred_provider = Some(provider);
        self
    }

    pub fn area_code(&self) -> &AreaCode {
        &self.item.area_code
    }

    /// Structured facts handed to the provider as its prompt.
    ///
    /// Factor names and scores only; no prose is composed here.
    pub fn prompt(&self) -> String {
        let list = |highlights: &[crate::domain::scoring::FactorHighlight]| {
            highlights
                .iter()
                .map(|h| format!("{}={}", h.factor, h.score))
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "area={}; persona={}; composite={:.1}; strengths=[{}]; weaknesses=[{}]",
            self.item.area_code,
            self.persona,
            self.item.composite_score,
            list(&self.item.strengths),
            list(&self.item.weaknesses),
        )
    }
}

/// Raw output of a single provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderOutput {
    pub artifact_url: String,
    pub duration_secs: u32,
    /// Cost reported by the provider, if any.
    pub cost_usd: Option<f64>,
}

/// A successfully generated artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub area_code: AreaCode,
    pub persona: PersonaId,
    pub provider_used: VideoProviderKind,
    pub artifact_url: String,
    pub duration_secs: u32,
    pub cost_usd: f64,
    pub generation_time_seconds: f64,
    pub created_at: Timestamp,
}
