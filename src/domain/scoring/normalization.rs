//! Normalisation functions.
//!
//! Two layers live here:
//!
//! - raw-unit mappings used by the source adapters when building snapshots
//!   (crime counts, amenity counts, interchange counts, inspection grades);
//! - one factor function per [`Factor`] that turns an optional snapshot into
//!   a [`FactorScore`]. A missing snapshot always yields
//!   [`FactorScore::NEUTRAL`]; this is the only place that rule is applied.

use crate::domain::enrichment::{
    AmenitiesSnapshot, CommuteSnapshot, CrimeSnapshot, DataOrigin, EnrichmentRecord,
    PropertySnapshot, SchoolsSnapshot,
};

use super::{Factor, FactorScore};

/// Commute duration at (or beyond) which the commute factor reaches zero.
pub const COMMUTE_ZERO_MINUTES: f64 = 60.0;

/// Nightlife venue count at which the nightlife factor saturates.
pub const NIGHTLIFE_SATURATION: f64 = 25.0;

/// Safety score from monthly street-crime count around the centroid.
pub fn safety_from_crime_count(total: u32) -> f64 {
    match total {
        0..=29 => 90.0,
        30..=59 => 75.0,
        60..=89 => 60.0,
        90..=119 => 45.0,
        _ => 30.0,
    }
}

/// Density score from the number of amenities within the search radius.
pub fn density_from_amenity_count(count: u32) -> f64 {
    match count {
        c if c > 100 => 95.0,
        c if c > 50 => 80.0,
        c if c > 25 => 65.0,
        c if c > 10 => 50.0,
        _ => 30.0,
    }
}

/// Accessibility score from the number of interchanges on a journey.
pub fn accessibility_from_changes(changes: u32) -> f64 {
    (100.0 - 20.0 * f64::from(changes)).max(30.0)
}

/// Score for an inspection grade; `None` for unrecognised grades.
pub fn school_grade_score(grade: &str) -> Option<f64> {
    let normalised = grade.trim().to_ascii_lowercase().replace([' ', '-'], "_");
    match normalised.as_str() {
        "outstanding" | "1" => Some(95.0),
        "good" | "2" => Some(75.0),
        "requires_improvement" | "satisfactory" | "3" => Some(55.0),
        "inadequate" | "4" => Some(30.0),
        _ => None,
    }
}

/// Average of mapped grades, neutral when nothing is rated.
pub fn average_school_quality(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return FactorScore::NEUTRAL.value();
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

pub fn affordability(property: Option<&PropertySnapshot>) -> FactorScore {
    property
        .map(|p| FactorScore::new(p.affordability_score))
        .unwrap_or(FactorScore::NEUTRAL)
}

pub fn investment(property: Option<&PropertySnapshot>) -> FactorScore {
    property
        .map(|p| FactorScore::new(p.investment_quality))
        .unwrap_or(FactorScore::NEUTRAL)
}

/// Linear: 0 minutes scores 100, [`COMMUTE_ZERO_MINUTES`] or more scores 0.
pub fn commute(commute: Option<&CommuteSnapshot>) -> FactorScore {
    commute
        .map(|c| FactorScore::new(100.0 - c.duration_minutes / COMMUTE_ZERO_MINUTES * 100.0))
        .unwrap_or(FactorScore::NEUTRAL)
}

pub fn safety(crime: Option<&CrimeSnapshot>) -> FactorScore {
    crime
        .map(|c| FactorScore::new(c.safety_score))
        .unwrap_or(FactorScore::NEUTRAL)
}

pub fn schools(schools: Option<&SchoolsSnapshot>) -> FactorScore {
    schools
        .map(|s| FactorScore::new(s.average_quality))
        .unwrap_or(FactorScore::NEUTRAL)
}

pub fn amenities(amenities: Option<&AmenitiesSnapshot>) -> FactorScore {
    amenities
        .map(|a| FactorScore::new(a.density_score))
        .unwrap_or(FactorScore::NEUTRAL)
}

/// `min(count / 25, 1) * 100`.
pub fn nightlife(amenities: Option<&AmenitiesSnapshot>) -> FactorScore {
    amenities
        .map(|a| {
            FactorScore::new((f64::from(a.nightlife_count) / NIGHTLIFE_SATURATION).min(1.0) * 100.0)
        })
        .unwrap_or(FactorScore::NEUTRAL)
}

/// Score one factor from a record, with the provenance of the value used.
pub fn extract(record: &EnrichmentRecord, factor: Factor) -> (FactorScore, DataOrigin) {
    let score = match factor {
        Factor::Affordability => affordability(record.property()),
        Factor::Investment => investment(record.property()),
        Factor::Commute => commute(record.commute()),
        Factor::Safety => safety(record.crime()),
        Factor::Schools => schools(record.schools()),
        Factor::Amenities => amenities(record.amenities()),
        Factor::Nightlife => nightlife(record.amenities()),
    };
    (score, record.origin(factor.source()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn commute_of(minutes: f64) -> CommuteSnapshot {
        CommuteSnapshot {
            origin: "E1".into(),
            destination: "UCL".into(),
            duration_minutes: minutes,
            changes: 1,
            walking_minutes: 5.0,
            accessibility_score: 80.0,
        }
    }

    fn amenities_of(nightlife_count: u32) -> AmenitiesSnapshot {
        AmenitiesSnapshot {
            amenity_count: 40,
            density_score: 65.0,
            nightlife_count,
        }
    }

    #[test]
    fn missing_snapshots_score_exactly_neutral() {
        assert_eq!(affordability(None).value(), 50.0);
        assert_eq!(investment(None).value(), 50.0);
        assert_eq!(commute(None).value(), 50.0);
        assert_eq!(safety(None).value(), 50.0);
        assert_eq!(schools(None).value(), 50.0);
        assert_eq!(amenities(None).value(), 50.0);
        assert_eq!(nightlife(None).value(), 50.0);
    }

    #[test]
    fn commute_is_linear_and_clamped() {
        assert_eq!(commute(Some(&commute_of(0.0))).value(), 100.0);
        assert_eq!(commute(Some(&commute_of(30.0))).value(), 50.0);
        assert_eq!(commute(Some(&commute_of(90.0))).value(), 0.0);
    }

    #[test]
    fn nightlife_saturates_at_twenty_five_venues() {
        assert_eq!(nightlife(Some(&amenities_of(0))).value(), 0.0);
        assert_eq!(nightlife(Some(&amenities_of(10))).value(), 40.0);
        assert_eq!(nightlife(Some(&amenities_of(25))).value(), 100.0);
        assert_eq!(nightlife(Some(&amenities_of(80))).value(), 100.0);
    }

    #[test]
    fn safety_buckets_follow_crime_counts() {
        assert_eq!(safety_from_crime_count(0), 90.0);
        assert_eq!(safety_from_crime_count(29), 90.0);
        assert_eq!(safety_from_crime_count(30), 75.0);
        assert_eq!(safety_from_crime_count(89), 60.0);
        assert_eq!(safety_from_crime_count(119), 45.0);
        assert_eq!(safety_from_crime_count(500), 30.0);
    }

    #[test]
    fn density_buckets_follow_amenity_counts() {
        assert_eq!(density_from_amenity_count(101), 95.0);
        assert_eq!(density_from_amenity_count(100), 80.0);
        assert_eq!(density_from_amenity_count(26), 65.0);
        assert_eq!(density_from_amenity_count(11), 50.0);
        assert_eq!(density_from_amenity_count(10), 30.0);
    }

    #[test]
    fn accessibility_drops_twenty_per_change_with_floor() {
        assert_eq!(accessibility_from_changes(0), 100.0);
        assert_eq!(accessibility_from_changes(2), 60.0);
        assert_eq!(accessibility_from_changes(5), 30.0);
    }

    #[test]
    fn school_grades_map_to_scores() {
        assert_eq!(school_grade_score("Outstanding"), Some(95.0));
        assert_eq!(school_grade_score("requires improvement"), Some(55.0));
        assert_eq!(school_grade_score("Requires-Improvement"), Some(55.0));
        assert_eq!(school_grade_score("unknown"), None);
        assert_eq!(average_school_quality(&[]), 50.0);
        assert_eq!(average_school_quality(&[95.0, 75.0]), 85.0);
    }

    #[test]
    fn safety_passes_through_snapshot_score() {
        let crime = CrimeSnapshot {
            total_crimes: 45,
            by_category: BTreeMap::new(),
            safety_score: 75.0,
        };
        assert_eq!(safety(Some(&crime)).value(), 75.0);
    }
}
