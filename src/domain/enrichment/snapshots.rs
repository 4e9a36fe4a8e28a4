//! Normalised per-source schemas.
//!
//! Each source adapter maps its raw payload onto exactly one of these
//! snapshots; the scoring engine only ever reads snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Coordinates;

use super::SourceKind;

/// Property intelligence for one area. Scores are on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub affordability_score: f64,
    pub investment_quality: f64,
    pub risk_score: f64,
    pub demand_index: f64,
    /// Average monthly rent in GBP, when known.
    pub rent_per_month: Option<f64>,
    /// Average purchase price in GBP, when known.
    pub purchase_price: Option<f64>,
    /// Gross rental yield, percent.
    pub yield_estimate: f64,
    #[serde(default)]
    pub price_trends: PriceTrends,
}

/// Percentage price change over trailing windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTrends {
    pub one_year: f64,
    pub three_year: f64,
    pub five_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommuteSnapshot {
    pub origin: String,
    pub destination: String,
    pub duration_minutes: f64,
    pub changes: u32,
    pub walking_minutes: f64,
    pub accessibility_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeSnapshot {
    pub total_crimes: u32,
    pub by_category: BTreeMap<String, u32>,
    pub safety_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolsSnapshot {
    pub school_count: u32,
    pub rated_count: u32,
    /// Mean mapped rating; 50 when no school carries a rating.
    pub average_quality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenitiesSnapshot {
    pub amenity_count: u32,
    pub density_score: f64,
    /// Pubs, bars and nightclubs.
    pub nightlife_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographySnapshot {
    pub centroid: Coordinates,
    pub district: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSnapshot {
    pub summary: String,
    pub key_points: Vec<String>,
    pub citations: Vec<String>,
}

/// Normalised payload of one source, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceData {
    Property(PropertySnapshot),
    Commute(CommuteSnapshot),
    Crime(CrimeSnapshot),
    Schools(SchoolsSnapshot),
    Amenities(AmenitiesSnapshot),
    Geography(GeographySnapshot),
    Research(ResearchSnapshot),
}

impl SourceData {
    /// The source this payload belongs to.
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceData::Property(_) => SourceKind::Property,
            SourceData::Commute(_) => SourceKind::Commute,
            SourceData::Crime(_) => SourceKind::Crime,
            SourceData::Schools(_) => SourceKind::Schools,
            SourceData::Amenities(_) => SourceKind::Amenities,
            SourceData::Geography(_) => SourceKind::Geography,
            SourceData::Research(_) => SourceKind::Research,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_data_is_tagged_with_kind() {
        let data = SourceData::Amenities(AmenitiesSnapshot {
            amenity_count: 60,
            density_score: 80.0,
            nightlife_count: 12,
        });
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["kind"], "amenities");
        assert_eq!(json["nightlife_count"], 12);
        assert_eq!(data.kind(), SourceKind::Amenities);
    }

    #[test]
    fn price_trends_default_when_missing() {
        let json = serde_json::json!({
            "affordability_score": 70.0,
            "investment_quality": 60.0,
            "risk_score": 40.0,
            "demand_index": 55.0,
            "rent_per_month": 1100.0,
            "purchase_price": null,
            "yield_estimate": 4.2
        });
        let snapshot: PropertySnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(snapshot.price_trends, PriceTrends::default());
        assert_eq!(snapshot.purchase_price, None);
    }
}
