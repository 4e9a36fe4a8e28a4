//! GetAreaProfileHandler - the full enrichment record for one area.

use std::sync::Arc;

use crate::application::EnrichmentOrchestrator;
use crate::domain::enrichment::EnrichmentOutcome;
use crate::domain::foundation::AreaCode;

/// Query for one area's enrichment.
#[derive(Debug, Clone)]
pub struct GetAreaProfileQuery {
    pub area_code: AreaCode,
    pub destination: Option<String>,
}

/// Handler for single-area enrichment.
///
/// An excluded area is still returned; the caller decides how to present a
/// missing critical source.
pub struct GetAreaProfileHandler {
    orchestrator: Arc<EnrichmentOrchestrator>,
}

impl GetAreaProfileHandler {
    pub fn new(orchestrator: Arc<EnrichmentOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub async fn handle(&self, query: GetAreaProfileQuery) -> EnrichmentOutcome {
        self.orchestrator
            .enrich(query.area_code, query.destination)
            .await
    }
}
