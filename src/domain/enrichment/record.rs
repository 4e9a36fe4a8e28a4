//! Per-source results and the per-area enrichment record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{AreaCode, Timestamp};

use super::snapshots::{
    AmenitiesSnapshot, CommuteSnapshot, CrimeSnapshot, GeographySnapshot, PropertySnapshot,
    ResearchSnapshot, SchoolsSnapshot, SourceData,
};
use super::{DataOrigin, SourceErrorKind, SourceKind};

/// Outcome of asking one source about one area.
///
/// `data == None` with `error == Some(_)` marks a degraded but non-fatal fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: SourceKind,
    pub data: Option<SourceData>,
    pub fetched_at: Timestamp,
    pub from_cache: bool,
    pub error: Option<SourceErrorKind>,
}

impl SourceResult {
    /// Data fetched from the source during this request.
    pub fn fresh(data: SourceData) -> Self {
        Self {
            source: data.kind(),
            data: Some(data),
            fetched_at: Timestamp::now(),
            from_cache: false,
            error: None,
        }
    }

    /// Data served from the cache store.
    pub fn cached(data: SourceData) -> Self {
        Self {
            source: data.kind(),
            data: Some(data),
            fetched_at: Timestamp::now(),
            from_cache: true,
            error: None,
        }
    }

    /// No data; carries the failure class for traceability.
    pub fn failed(source: SourceKind, error: SourceErrorKind) -> Self {
        Self {
            source,
            data: None,
            fetched_at: Timestamp::now(),
            from_cache: false,
            error: Some(error),
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn origin(&self) -> DataOrigin {
        match (&self.data, self.from_cache) {
            (None, _) => DataOrigin::Defaulted,
            (Some(_), true) => DataOrigin::Cached,
            (Some(_), false) => DataOrigin::Fresh,
        }
    }
}

/// All source results for one area within one request.
///
/// Holds exactly one entry per configured source, even when that entry has
/// no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub area_code: AreaCode,
    pub sources: BTreeMap<SourceKind, SourceResult>,
    pub destination: Option<String>,
}

impl EnrichmentRecord {
    /// Builds a record from whatever results arrived.
    ///
    /// Every kind in `configured` gets an entry; kinds with no result are
    /// filled with a `Timeout` failure. Results for kinds outside
    /// `configured` are dropped.
    pub fn assemble(
        area_code: AreaCode,
        destination: Option<String>,
        configured: &[SourceKind],
        results: impl IntoIterator<Item = SourceResult>,
    ) -> Self {
        let mut sources: BTreeMap<SourceKind, SourceResult> = results
            .into_iter()
            .filter(|r| configured.contains(&r.source))
            .map(|r| (r.source, r))
            .collect();

        for kind in configured {
            sources
                .entry(*kind)
                .or_insert_with(|| SourceResult::failed(*kind, SourceErrorKind::Timeout));
        }

        Self {
            area_code,
            sources,
            destination,
        }
    }

    pub fn result(&self, kind: SourceKind) -> Option<&SourceResult> {
        self.sources.get(&kind)
    }

    fn data(&self, kind: SourceKind) -> Option<&SourceData> {
        self.sources.get(&kind).and_then(|r| r.data.as_ref())
    }

    /// True when the critical source returned data.
    pub fn is_viable(&self) -> bool {
        self.sources
            .values()
            .any(|r| r.source.is_critical() && r.has_data())
    }

    /// Provenance of a source's data, `Defaulted` when not configured.
    pub fn origin(&self, kind: SourceKind) -> DataOrigin {
        self.result(kind)
            .map(SourceResult::origin)
            .unwrap_or(DataOrigin::Defaulted)
    }

    /// Sources that returned data, in enrichment order.
    pub fn available_sources(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.sources
            .values()
            .filter(|r| r.has_data())
            .map(|r| r.source)
    }

    pub fn property(&self) -> Option<&PropertySnapshot> {
        match self.data(SourceKind::Property) {
            Some(SourceData::Property(s)) => Some(s),
            _ => None,
        }
    }

    pub fn commute(&self) -> Option<&CommuteSnapshot> {
        match self.data(SourceKind::Commute) {
            Some(SourceData::Commute(s)) => Some(s),
            _ => None,
        }
    }

    pub fn crime(&self) -> Option<&CrimeSnapshot> {
        match self.data(SourceKind::Crime) {
            Some(SourceData::Crime(s)) => Some(s),
            _ => None,
        }
    }

    pub fn schools(&self) -> Option<&SchoolsSnapshot> {
        match self.data(SourceKind::Schools) {
            Some(SourceData::Schools(s)) => Some(s),
            _ => None,
        }
    }

    pub fn amenities(&self) -> Option<&AmenitiesSnapshot> {
        match self.data(SourceKind::Amenities) {
            Some(SourceData::Amenities(s)) => Some(s),
            _ => None,
        }
    }

    pub fn geography(&self) -> Option<&GeographySnapshot> {
        match self.data(SourceKind::Geography) {
            Some(SourceData::Geography(s)) => Some(s),
            _ => None,
        }
    }

    pub fn research(&self) -> Option<&ResearchSnapshot> {
        match self.data(SourceKind::Research) {
            Some(SourceData::Research(s)) => Some(s),
            _ => None,
        }
    }
}

/// Result of enriching one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "record", rename_all = "snake_case")]
pub enum EnrichmentOutcome {
    /// Critical source present; the area can be scored.
    Ready(EnrichmentRecord),
    /// Critical source missing; the area is excluded from ranking.
    Excluded(EnrichmentRecord),
}

impl EnrichmentOutcome {
    /// Classifies a record by critical-source availability.
    pub fn from_record(record: EnrichmentRecord) -> Self {
        if record.is_viable() {
            EnrichmentOutcome::Ready(record)
        } else {
            EnrichmentOutcome::Excluded(record)
        }
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, EnrichmentOutcome::Excluded(_))
    }

    pub fn record(&self) -> &EnrichmentRecord {
        match self {
            EnrichmentOutcome::Ready(r) | EnrichmentOutcome::Excluded(r) => r,
        }
    }

    pub fn into_record(self) -> EnrichmentRecord {
        match self {
            EnrichmentOutcome::Ready(r) | EnrichmentOutcome::Excluded(r) => r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::snapshots::{CrimeSnapshot, PriceTrends};

    fn property() -> SourceData {
        SourceData::Property(PropertySnapshot {
            affordability_score: 80.0,
            investment_quality: 60.0,
            risk_score: 30.0,
            demand_index: 70.0,
            rent_per_month: Some(1000.0),
            purchase_price: Some(350_000.0),
            yield_estimate: 4.5,
            price_trends: PriceTrends::default(),
        })
    }

    fn crime() -> SourceData {
        SourceData::Crime(CrimeSnapshot {
            total_crimes: 40,
            by_category: BTreeMap::new(),
            safety_score: 75.0,
        })
    }

    fn area() -> AreaCode {
        AreaCode::new("E1").unwrap()
    }

    #[test]
    fn assemble_fills_every_configured_source() {
        let record = EnrichmentRecord::assemble(
            area(),
            None,
            &SourceKind::ALL,
            vec![SourceResult::fresh(property())],
        );

        assert_eq!(record.sources.len(), SourceKind::ALL.len());
        let crime = record.result(SourceKind::Crime).unwrap();
        assert!(crime.data.is_none());
        assert_eq!(crime.error, Some(SourceErrorKind::Timeout));
    }

    #[test]
    fn assemble_drops_unconfigured_results() {
        let record = EnrichmentRecord::assemble(
            area(),
            None,
            &[SourceKind::Property],
            vec![SourceResult::fresh(property()), SourceResult::fresh(crime())],
        );
        assert_eq!(record.sources.len(), 1);
        assert!(record.crime().is_none());
    }

    #[test]
    fn record_without_property_is_not_viable() {
        let record = EnrichmentRecord::assemble(
            area(),
            None,
            &SourceKind::ALL,
            vec![SourceResult::fresh(crime())],
        );
        assert!(!record.is_viable());
        assert!(EnrichmentOutcome::from_record(record).is_excluded());
    }

    #[test]
    fn record_with_property_is_ready() {
        let record = EnrichmentRecord::assemble(
            area(),
            Some("UCL".into()),
            &SourceKind::ALL,
            vec![SourceResult::cached(property())],
        );
        assert!(record.is_viable());
        assert_eq!(record.origin(SourceKind::Property), DataOrigin::Cached);
        assert_eq!(record.origin(SourceKind::Crime), DataOrigin::Defaulted);
        assert!(!EnrichmentOutcome::from_record(record).is_excluded());
    }

    #[test]
    fn available_sources_lists_only_sources_with_data() {
        let record = EnrichmentRecord::assemble(
            area(),
            None,
            &SourceKind::ALL,
            vec![SourceResult::fresh(property()), SourceResult::fresh(crime())],
        );
        let available: Vec<_> = record.available_sources().collect();
        assert_eq!(available, vec![SourceKind::Property, SourceKind::Crime]);
    }

    #[test]
    fn origin_reflects_cache_flag() {
        assert_eq!(SourceResult::fresh(crime()).origin(), DataOrigin::Fresh);
        assert_eq!(SourceResult::cached(crime()).origin(), DataOrigin::Cached);
        assert_eq!(
            SourceResult::failed(SourceKind::Crime, SourceErrorKind::Network).origin(),
            DataOrigin::Defaulted
        );
    }
}
