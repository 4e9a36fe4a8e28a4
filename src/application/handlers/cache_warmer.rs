//! Cache warmer - keeps source data for popular areas hot.
//!
//! Runs once at start-up and then on a fixed interval. Each pass enriches
//! the configured areas through the normal orchestrator, which writes every
//! fresh source result through to the cache. Failures are logged; the loop
//! never stops on its own.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::application::EnrichmentOrchestrator;
use crate::domain::foundation::AreaCode;

/// Outcome of one warming pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub warmed: Vec<AreaCode>,
    /// Areas whose critical source failed during the pass.
    pub excluded: Vec<AreaCode>,
}

/// Periodic pre-fetch of source data.
pub struct CacheWarmer {
    orchestrator: Arc<EnrichmentOrchestrator>,
    areas: Vec<AreaCode>,
    destination: Option<String>,
    period: Duration,
}

impl CacheWarmer {
    pub fn new(orchestrator: Arc<EnrichmentOrchestrator>, areas: Vec<AreaCode>, period: Duration) -> Self {
        Self {
            orchestrator,
            areas,
            destination: None,
            period,
        }
    }

    pub fn with_destination(mut self, destination: Option<String>) -> Self {
        self.destination = destination;
        self
    }

    /// Enriches every configured area once, one area at a time.
    pub async fn warm_once(&self) -> WarmReport {
        let mut report = WarmReport::default();
        for area in &self.areas {
            let outcome = self
                .orchestrator
                .enrich(area.clone(), self.destination.clone())
                .await;
            if outcome.is_excluded() {
                tracing::warn!(area_code = %area, "Cache warm: critical source unavailable");
                report.excluded.push(area.clone());
            } else {
                report.warmed.push(area.clone());
            }
        }
        report
    }

    /// Warms immediately, then every `period`, forever.
    pub async fn run(self) {
        let mut ticker = interval(self.period.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = self.warm_once().await;
            tracing::info!(
                warmed = report.warmed.len(),
                excluded = report.excluded.len(),
                "Cache warm pass complete"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCacheStore;
    use crate::adapters::sources::{CachedSourceAdapter, StubResponse, StubSourceProvider};
    use crate::domain::enrichment::{PriceTrends, PropertySnapshot, SourceData, SourceErrorKind, SourceKind};
    use crate::ports::{CacheStore, SourceAdapter};

    #[tokio::test]
    async fn warm_pass_populates_cache_and_reports_failures() {
        let cache = Arc::new(InMemoryCacheStore::new());
        let stub = StubSourceProvider::new(SourceKind::Property)
            .with_area(
                AreaCode::new("E1").unwrap(),
                StubResponse::Data(SourceData::Property(PropertySnapshot {
                    affordability_score: 70.0,
                    investment_quality: 60.0,
                    risk_score: 40.0,
                    demand_index: 50.0,
                    rent_per_month: None,
                    purchase_price: None,
                    yield_estimate: 4.0,
                    price_trends: PriceTrends::default(),
                })),
            )
            .with_default(StubResponse::Error(SourceErrorKind::NotFound));
        let adapters: Vec<Arc<dyn SourceAdapter>> =
            vec![Arc::new(CachedSourceAdapter::new(Arc::new(stub), cache.clone()))];
        let warmer = CacheWarmer::new(
            Arc::new(EnrichmentOrchestrator::new(adapters)),
            vec![AreaCode::new("E1").unwrap(), AreaCode::new("ZZ1").unwrap()],
            Duration::from_secs(3600),
        );

        let report = warmer.warm_once().await;

        assert_eq!(report.warmed, vec![AreaCode::new("E1").unwrap()]);
        assert_eq!(report.excluded, vec![AreaCode::new("ZZ1").unwrap()]);
        assert!(cache.get("property:E1").await.unwrap().is_some());
    }
}
