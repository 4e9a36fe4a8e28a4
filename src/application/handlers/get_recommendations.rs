//! GetRecommendationsHandler - ranks candidate areas for a persona.
//!
//! Pipeline: persona lookup, importance adjustment, response cache check,
//! concurrent enrichment of every candidate under one request deadline,
//! hard-constraint filtering, scoring and truncation. The finished response is cached for an hour.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use crate::application::EnrichmentOrchestrator;
use crate::domain::enrichment::{EnrichmentRecord, SourceKind};
use crate::domain::foundation::{AreaCode, Gazetteer, PersonaId, Timestamp, ValidationError};
use crate::domain::scoring::{
    FilteredArea, HardConstraints, ImportanceRatings, LocationType, PersonaCatalog,
    RecommendationItem, ScoringEngine, SearchCriteria,
};
use crate::ports::{CacheKey, CacheStore, CacheStoreExt};

/// Filtered areas reported back to the caller.
pub const FILTERED_EXAMPLES: usize = 5;

/// Query for a ranked recommendation list.
#[derive(Debug, Clone)]
pub struct GetRecommendationsQuery {
    pub persona: PersonaId,
    pub budget: f64,
    pub location_type: LocationType,
    pub destination: Option<String>,
    pub max_areas: Option<usize>,
    pub importance: Option<ImportanceRatings>,
    pub constraints: HardConstraints,
    /// Overrides the default candidate list.
    pub candidates: Option<Vec<AreaCode>>,
}

impl GetRecommendationsQuery {
    pub fn new(persona: PersonaId, budget: f64, location_type: LocationType) -> Self {
        Self {
            persona,
            budget,
            location_type,
            destination: None,
            max_areas: None,
            importance: None,
            constraints: HardConstraints::default(),
            candidates: None,
        }
    }
}

/// Areas removed by hard constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredSummary {
    pub count: usize,
    /// The first few, with reasons.
    pub examples: Vec<FilteredArea>,
}

/// Response metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub timestamp_utc: Timestamp,
    pub execution_time_ms: u64,
    /// Sources that returned data for at least one returned area.
    pub sources_used: Vec<SourceKind>,
    pub cached: bool,
    pub no_viable_areas: bool,
    pub excluded_areas: Vec<AreaCode>,
    pub filtered_out: FilteredSummary,
}

/// Ranked items plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub persona: PersonaId,
    pub items: Vec<RecommendationItem>,
    pub metadata: RecommendationMetadata,
}

/// Caller-visible request failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecommendationError {
    #[error("unknown persona '{0}'")]
    UnknownPersona(PersonaId),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
}

/// Tunables for the recommendation pipeline.
#[derive(Debug, Clone)]
pub struct RecommendationSettings {
    pub default_candidates: Vec<AreaCode>,
    pub max_candidates: usize,
    /// Areas enriched at once.
    pub area_concurrency: usize,
    pub default_max_areas: usize,
    pub default_destination: Option<String>,
    pub response_ttl_secs: u64,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            default_candidates: Gazetteer::residential_codes()
                .filter_map(|code| AreaCode::new(code).ok())
                .collect(),
            max_candidates: 20,
            area_concurrency: 20,
            default_max_areas: 5,
            default_destination: None,
            response_ttl_secs: 3600,
        }
    }
}

/// Handler for ranked recommendations.
pub struct GetRecommendationsHandler {
    orchestrator: Arc<EnrichmentOrchestrator>,
    catalog: Arc<PersonaCatalog>,
    cache: Arc<dyn CacheStore>,
    settings: RecommendationSettings,
}

impl GetRecommendationsHandler {
    pub fn new(
        orchestrator: Arc<EnrichmentOrchestrator>,
        catalog: Arc<PersonaCatalog>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            orchestrator,
            catalog,
            cache,
            settings: RecommendationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: RecommendationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub async fn handle(
        &self,
        query: GetRecommendationsQuery,
    ) -> Result<RecommendationResponse, RecommendationError> {
        let started = Instant::now();

        let base_weights = self
            .catalog
            .get(&query.persona)
            .ok_or_else(|| RecommendationError::UnknownPersona(query.persona.clone()))?;
        let weights = match &query.importance {
            Some(ratings) if !ratings.is_empty() => base_weights.adjusted(ratings)?,
            _ => base_weights.clone(),
        };
        let criteria = SearchCriteria::new(query.budget, query.location_type, query.constraints.clone())?;

        let max_areas = query.max_areas.unwrap_or(self.settings.default_max_areas);
        if max_areas == 0 {
            return Err(ValidationError::out_of_range("max_areas", 1.0, f64::MAX, 0.0).into());
        }

        let destination = query
            .destination
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| self.settings.default_destination.clone());
        let candidates = self.candidates(query.candidates.as_deref());

        let key = CacheKey::recommendations(
            &query.persona,
            query.budget,
            query.location_type,
            destination.as_deref().unwrap_or(""),
            Some(&json!({
                "importance": query.importance,
                "constraints": query.constraints,
                "candidates": query.candidates,
                "maxAreas": query.max_areas,
            })),
        );

        if let Some(mut cached) = self.read_cache(&key).await {
            tracing::debug!(persona = %query.persona, key = %key, "Recommendation cache hit");
            cached.metadata.cached = true;
            cached.metadata.execution_time_ms = started.elapsed().as_millis() as u64;
            return Ok(cached);
        }

        let deadline = tokio::time::Instant::now() + self.orchestrator.deadline();
        let records: Vec<EnrichmentRecord> = stream::iter(candidates)
            .map(|area| {
                let destination = destination.clone();
                async move {
                    self.orchestrator
                        .enrich_until(area, destination, deadline)
                        .await
                        .into_record()
                }
            })
            .buffer_unordered(self.settings.area_concurrency.max(1))
            .collect()
            .await;

        let mut filtered = Vec::new();
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if record.is_viable() {
                if let Err(reason) = criteria.check(&record) {
                    filtered.push(FilteredArea {
                        area_code: record.area_code.clone(),
                        reason,
                    });
                    continue;
                }
            }
            kept.push(record);
        }
        filtered.sort_by(|a, b| a.area_code.cmp(&b.area_code));

        let mut scored = ScoringEngine::score(&kept, &weights);
        scored.truncate(max_areas);

        let by_area: HashMap<&AreaCode, &EnrichmentRecord> =
            kept.iter().map(|r| (&r.area_code, r)).collect();
        let sources_used: BTreeSet<SourceKind> = scored
            .items
            .iter()
            .filter_map(|item| by_area.get(&item.area_code))
            .flat_map(|record| record.available_sources())
            .collect();

        let no_viable_areas = scored.no_viable_areas();
        if no_viable_areas {
            tracing::info!(persona = %query.persona, excluded = scored.excluded.len(), "No viable areas");
        }

        let filtered_count = filtered.len();
        filtered.truncate(FILTERED_EXAMPLES);

        let response = RecommendationResponse {
            persona: query.persona.clone(),
            items: scored.items,
            metadata: RecommendationMetadata {
                timestamp_utc: Timestamp::now(),
                execution_time_ms: started.elapsed().as_millis() as u64,
                sources_used: sources_used.into_iter().collect(),
                cached: false,
                no_viable_areas,
                excluded_areas: scored.excluded,
                filtered_out: FilteredSummary {
                    count: filtered_count,
                    examples: filtered,
                },
            },
        };

        if !response.items.is_empty() {
            if let Err(e) = self
                .cache
                .set_json(&key, &response, self.settings.response_ttl_secs)
                .await
            {
                tracing::warn!(key = %key, error = %e, "Recommendation cache write failed");
            }
        }

        tracing::info!(
            persona = %query.persona,
            returned = response.items.len(),
            elapsed_ms = response.metadata.execution_time_ms,
            "Recommendations ranked"
        );
        Ok(response)
    }

    /// Requested or default candidates, de-duplicated and capped.
    fn candidates(&self, requested: Option<&[AreaCode]>) -> Vec<AreaCode> {
        let source = match requested {
            Some(list) if !list.is_empty() => list,
            _ => self.settings.default_candidates.as_slice(),
        };
        let mut seen = BTreeSet::new();
        source
            .iter()
            .filter(|code| seen.insert((*code).clone()))
            .take(self.settings.max_candidates)
            .cloned()
            .collect()
    }

    async fn read_cache(&self, key: &str) -> Option<RecommendationResponse> {
        match self.cache.get_json::<RecommendationResponse>(key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Recommendation cache read failed, treating as miss");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use crate::adapters::sources::{CachedSourceAdapter, StubResponse, StubSourceProvider};
    use crate::domain::enrichment::{
        CrimeSnapshot, DataOrigin, PriceTrends, PropertySnapshot, SourceData, SourceErrorKind,
    };
    use crate::domain::scoring::Factor;
    use crate::ports::SourceAdapter;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn property(affordability: f64, rent: f64) -> StubResponse {
        StubResponse::Data(SourceData::Property(PropertySnapshot {
            affordability_score: affordability,
            investment_quality: 50.0,
            risk_score: 50.0,
            demand_index: 50.0,
            rent_per_month: Some(rent),
            purchase_price: None,
            yield_estimate: 4.0,
            price_trends: PriceTrends::default(),
        }))
    }

    fn crime(safety: f64) -> StubResponse {
        StubResponse::Data(SourceData::Crime(CrimeSnapshot {
            total_crimes: 10,
            by_category: BTreeMap::new(),
            safety_score: safety,
        }))
    }

    fn code(s: &str) -> AreaCode {
        AreaCode::new(s).unwrap()
    }

    struct Fixture {
        property: StubSourceProvider,
        crime: StubSourceProvider,
        cache: Arc<InMemoryCacheStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let property = StubSourceProvider::new(SourceKind::Property)
                .with_area(code("E2"), property(90.0, 1500.0))
                .with_area(code("N1"), property(60.0, 2100.0))
                .with_area(code("SE1"), property(75.0, 3200.0))
                .with_default(StubResponse::Error(SourceErrorKind::NotFound));
            let crime = StubSourceProvider::new(SourceKind::Crime)
                .with_area(code("E2"), crime(60.0))
                .with_default(StubResponse::Error(SourceErrorKind::Auth));
            Self {
                property,
                crime,
                cache: Arc::new(InMemoryCacheStore::new()),
            }
        }

        fn handler(&self) -> GetRecommendationsHandler {
            let source_cache = Arc::new(InMemoryCacheStore::new());
            let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
                Arc::new(
                    CachedSourceAdapter::new(Arc::new(self.property.clone()), source_cache.clone())
                        .with_retry_base_delay(Duration::from_millis(1)),
                ),
                Arc::new(
                    CachedSourceAdapter::new(Arc::new(self.crime.clone()), source_cache)
                        .with_retry_base_delay(Duration::from_millis(1)),
                ),
            ];
            GetRecommendationsHandler::new(
                Arc::new(EnrichmentOrchestrator::new(adapters)),
                Arc::new(PersonaCatalog::builtin().unwrap()),
                self.cache.clone(),
            )
            .with_settings(RecommendationSettings {
                default_candidates: vec![code("E2"), code("N1"), code("SE1"), code("ZZ9")],
                ..RecommendationSettings::default()
            })
        }
    }

    fn query(budget: f64) -> GetRecommendationsQuery {
        GetRecommendationsQuery::new(PersonaId::new("student").unwrap(), budget, LocationType::Rent)
    }

    #[tokio::test]
    async fn ranks_viable_areas_and_reports_exclusions() {
        let fx = Fixture::new();
        let response = fx.handler().handle(query(5000.0)).await.unwrap();

        let order: Vec<&str> = response.items.iter().map(|i| i.area_code.as_str()).collect();
        assert_eq!(order, vec!["E2", "SE1", "N1"]);
        assert_eq!(response.metadata.excluded_areas, vec![code("ZZ9")]);
        assert!(!response.metadata.no_viable_areas);
        assert!(!response.metadata.cached);
        assert_eq!(
            response.metadata.sources_used,
            vec![SourceKind::Property, SourceKind::Crime]
        );
    }

    #[tokio::test]
    async fn missing_optional_source_scores_neutral() {
        let fx = Fixture::new();
        let response = fx.handler().handle(query(5000.0)).await.unwrap();

        let n1 = response.items.iter().find(|i| i.area_code == code("N1")).unwrap();
        assert_eq!(n1.factor_scores[&Factor::Safety].value(), 50.0);
    }

    #[tokio::test]
    async fn budget_filters_with_reasons() {
        let fx = Fixture::new();
        let response = fx.handler().handle(query(2000.0)).await.unwrap();

        let order: Vec<&str> = response.items.iter().map(|i| i.area_code.as_str()).collect();
        assert_eq!(order, vec!["E2"]);
        assert_eq!(response.metadata.filtered_out.count, 2);
        assert_eq!(response.metadata.filtered_out.examples[0].area_code, code("N1"));
        assert!(response.metadata.filtered_out.examples[0]
            .reason
            .starts_with("Over budget"));
    }

    #[tokio::test]
    async fn all_excluded_is_flagged_not_failed() {
        let fx = Fixture::new();
        let mut q = query(5000.0);
        q.candidates = Some(vec![code("ZZ1"), code("ZZ2")]);

        let response = fx.handler().handle(q).await.unwrap();

        assert!(response.items.is_empty());
        assert!(response.metadata.no_viable_areas);
        assert_eq!(response.metadata.excluded_areas, vec![code("ZZ1"), code("ZZ2")]);
        assert!(response.metadata.sources_used.is_empty());
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let fx = Fixture::new();
        let handler = fx.handler();

        let first = handler.handle(query(5000.0)).await.unwrap();
        let calls = fx.property.call_count();
        let second = handler.handle(query(5000.0)).await.unwrap();

        assert!(!first.metadata.cached);
        assert!(second.metadata.cached);
        assert_eq!(fx.property.call_count(), calls);
        assert_eq!(
            first.items.iter().map(|i| i.rank).collect::<Vec<_>>(),
            second.items.iter().map(|i| i.rank).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn max_areas_truncates_after_ranking() {
        let fx = Fixture::new();
        let mut q = query(5000.0);
        q.max_areas = Some(2);

        let response = fx.handler().handle(q).await.unwrap();

        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].area_code, code("E2"));
        assert_eq!(response.items[1].rank, 2);
    }

    #[tokio::test]
    async fn unknown_persona_is_rejected() {
        let fx = Fixture::new();
        let q = GetRecommendationsQuery::new(PersonaId::new("pirate").unwrap(), 1000.0, LocationType::Rent);

        let err = fx.handler().handle(q).await.unwrap_err();

        assert!(matches!(err, RecommendationError::UnknownPersona(_)));
    }

    #[tokio::test]
    async fn invalid_budget_is_rejected() {
        let fx = Fixture::new();
        let err = fx.handler().handle(query(-1.0)).await.unwrap_err();
        assert!(matches!(err, RecommendationError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn queued_areas_share_the_request_deadline() {
        let fx = Fixture::new();
        let slow_crime = StubSourceProvider::new(SourceKind::Crime)
            .with_default(crime(70.0))
            .with_delay(Duration::from_millis(400));
        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(CachedSourceAdapter::new(
                Arc::new(fx.property.clone()),
                Arc::new(InMemoryCacheStore::new()),
            )),
            Arc::new(CachedSourceAdapter::new(
                Arc::new(slow_crime),
                Arc::new(InMemoryCacheStore::new()),
            )),
        ];
        let orchestrator =
            EnrichmentOrchestrator::new(adapters).with_deadline(Duration::from_millis(150));
        let handler = GetRecommendationsHandler::new(
            Arc::new(orchestrator),
            Arc::new(PersonaCatalog::builtin().unwrap()),
            fx.cache.clone(),
        )
        .with_settings(RecommendationSettings {
            default_candidates: vec![code("E2"), code("N1"), code("SE1"), code("E1"), code("W1")],
            area_concurrency: 1,
            ..RecommendationSettings::default()
        });

        let started = Instant::now();
        let response = handler.handle(query(5000.0)).await.unwrap();

        // One area at a time with per-area deadlines would take five times as long.
        assert!(started.elapsed() < Duration::from_millis(500), "took {:?}", started.elapsed());
        assert_eq!(response.items.len(), 3);
        for item in &response.items {
            assert_eq!(item.factor_sources[&Factor::Safety], DataOrigin::Defaulted);
        }
    }

    #[test]
    fn candidates_are_deduplicated_and_capped() {
        let fx = Fixture::new();
        let handler = fx.handler().with_settings(RecommendationSettings {
            max_candidates: 2,
            ..RecommendationSettings::default()
        });
        let list = handler.candidates(Some(&[code("E1"), code("E1"), code("N1"), code("W1")][..]));
        assert_eq!(list, vec![code("E1"), code("N1")]);
    }
}
