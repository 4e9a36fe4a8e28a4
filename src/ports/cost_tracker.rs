//! CostTracker port - Interface for recording generation spend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{AreaCode, PersonaId, Timestamp};
use crate::domain::generation::{GenerationResult, VideoProviderKind};

/// Cost of one successful generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub provider: VideoProviderKind,
    pub area_code: AreaCode,
    pub persona: PersonaId,
    pub cost_usd: f64,
    pub generation_time_seconds: f64,
    pub occurred_at: Timestamp,
}

impl From<&GenerationResult> for CostRecord {
    fn from(result: &GenerationResult) -> Self {
        Self {
            provider: result.provider_used,
            area_code: result.area_code.clone(),
            persona: result.persona.clone(),
            cost_usd: result.cost_usd,
            generation_time_seconds: result.generation_time_seconds,
            occurred_at: result.created_at,
        }
    }
}

/// Spend totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSummary {
    pub total_usd: f64,
    pub generations: u32,
    pub by_provider: BTreeMap<VideoProviderKind, f64>,
}

/// Port for tracking generation costs.
#[async_trait]
pub trait CostTracker: Send + Sync {
    async fn record(&self, record: CostRecord) -> Result<(), CostTrackerError>;

    async fn summary(&self) -> Result<CostSummary, CostTrackerError>;
}

/// Errors from the cost tracker.
#[derive(Debug, thiserror::Error)]
pub enum CostTrackerError {
    #[error("storage error: {0}")]
    Storage(String),
}
