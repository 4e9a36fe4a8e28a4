//! GenerateVideoHandler - scores one area for a persona and renders a video.
//!
//! The area is enriched and scored on its own, so strengths and weaknesses
//! use the small-set thresholds. Generation failure is reported separately
//! from scoring: a scorable area with exhausted providers is a generation
//! error, not a recommendation error.

use std::sync::Arc;

use crate::adapters::generation::VideoGenerationChain;
use crate::application::EnrichmentOrchestrator;
use crate::domain::foundation::{AreaCode, PersonaId};
use crate::domain::generation::{GenerationRequest, GenerationResult, VideoProviderKind};
use crate::domain::scoring::{PersonaCatalog, ScoringEngine};
use crate::ports::GenerationError;

/// Command to render a video for one area.
#[derive(Debug, Clone)]
pub struct GenerateVideoCommand {
    pub area_code: AreaCode,
    pub persona: PersonaId,
    pub preferred_provider: Option<VideoProviderKind>,
    pub duration_secs: Option<u32>,
    pub destination: Option<String>,
}

/// Errors from video generation requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateVideoError {
    #[error("unknown persona '{0}'")]
    UnknownPersona(PersonaId),

    /// Critical source unavailable, so the area has no score to narrate.
    #[error("area '{0}' cannot be scored")]
    AreaNotScorable(AreaCode),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Handler for video generation.
pub struct GenerateVideoHandler {
    orchestrator: Arc<EnrichmentOrchestrator>,
    catalog: Arc<PersonaCatalog>,
    chain: Arc<VideoGenerationChain>,
}

impl GenerateVideoHandler {
    pub fn new(
        orchestrator: Arc<EnrichmentOrchestrator>,
        catalog: Arc<PersonaCatalog>,
        chain: Arc<VideoGenerationChain>,
    ) -> Self {
        Self {
            orchestrator,
            catalog,
            chain,
        }
    }

    pub async fn handle(&self, cmd: GenerateVideoCommand) -> Result<GenerationResult, GenerateVideoError> {
        let weights = self
            .catalog
            .get(&cmd.persona)
            .ok_or_else(|| GenerateVideoError::UnknownPersona(cmd.persona.clone()))?;

        let outcome = self
            .orchestrator
            .enrich(cmd.area_code.clone(), cmd.destination.clone())
            .await;
        let mut scored = ScoringEngine::score(std::slice::from_ref(outcome.record()), weights);
        let item = match scored.items.pop() {
            Some(item) => item,
            None => return Err(GenerateVideoError::AreaNotScorable(cmd.area_code)),
        };

        let mut request = GenerationRequest::new(item, cmd.persona);
        if let Some(secs) = cmd.duration_secs {
            request = request.with_duration(secs);
        }
        if let Some(provider) = cmd.preferred_provider {
            request = request.with_preferred_provider(provider);
        }

        Ok(self.chain.generate(&request).await?)
    }
}
