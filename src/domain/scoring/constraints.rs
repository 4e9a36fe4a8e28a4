//! Hard search constraints applied before scoring.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::enrichment::EnrichmentRecord;
use crate::domain::foundation::{AreaCode, ValidationError};

/// Whether the caller is renting or buying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Rent,
    Buy,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Rent => "rent",
            LocationType::Buy => "buy",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional thresholds beyond the budget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardConstraints {
    pub max_commute_minutes: Option<f64>,
    pub min_safety_score: Option<f64>,
    pub min_school_rating: Option<f64>,
}

/// Budget plus hard constraints for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    /// Monthly rent or total purchase price in GBP, by `location_type`.
    pub budget: f64,
    pub location_type: LocationType,
    pub constraints: HardConstraints,
}

/// An area removed by a hard constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredArea {
    pub area_code: AreaCode,
    pub reason: String,
}

impl SearchCriteria {
    pub fn new(
        budget: f64,
        location_type: LocationType,
        constraints: HardConstraints,
    ) -> Result<Self, ValidationError> {
        if !budget.is_finite() || budget <= 0.0 {
            return Err(ValidationError::out_of_range("budget", 0.0, f64::MAX, budget));
        }
        Ok(Self {
            budget,
            location_type,
            constraints,
        })
    }

    /// Checks a record against every constraint.
    ///
    /// A constraint whose source data is missing passes; unknown data never
    /// filters an area out.
    pub fn check(&self, record: &EnrichmentRecord) -> Result<(), String> {
        if let Some(property) = record.property() {
            let price = match self.location_type {
                LocationType::Rent => property.rent_per_month,
                LocationType::Buy => property.purchase_price,
            };
            if let Some(price) = price.filter(|p| *p > 0.0) {
                if price > self.budget {
                    return Err(format!("Over budget: £{:.0} > £{:.0}", price, self.budget));
                }
            }
        }

        if let (Some(max), Some(commute)) = (self.constraints.max_commute_minutes, record.commute()) {
            if commute.duration_minutes > max {
                return Err(format!(
                    "Commute too long: {:.0} min > {:.0} min",
                    commute.duration_minutes, max
                ));
            }
        }

        if let (Some(min), Some(crime)) = (self.constraints.min_safety_score, record.crime()) {
            if crime.safety_score < min {
                return Err(format!(
                    "Safety below minimum: {:.0} < {:.0}",
                    crime.safety_score, min
                ));
            }
        }

        if let (Some(min), Some(schools)) = (self.constraints.min_school_rating, record.schools()) {
            if schools.average_quality < min {
                return Err(format!(
                    "School rating below minimum: {:.0} < {:.0}",
                    schools.average_quality, min
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::{
        CommuteSnapshot, PriceTrends, PropertySnapshot, SourceData, SourceKind, SourceResult,
    };

    fn record(rent: Option<f64>, purchase: Option<f64>, commute_minutes: Option<f64>) -> EnrichmentRecord {
        let mut results = vec![SourceResult::fresh(SourceData::Property(PropertySnapshot {
            affordability_score: 70.0,
            investment_quality: 60.0,
            risk_score: 40.0,
            demand_index: 50.0,
            rent_per_month: rent,
            purchase_price: purchase,
            yield_estimate: 4.0,
            price_trends: PriceTrends::default(),
        }))];
        if let Some(minutes) = commute_minutes {
            results.push(SourceResult::fresh(SourceData::Commute(CommuteSnapshot {
                origin: "E1".into(),
                destination: "UCL".into(),
                duration_minutes: minutes,
                changes: 0,
                walking_minutes: 0.0,
                accessibility_score: 100.0,
            })));
        }
        EnrichmentRecord::assemble(AreaCode::new("E1").unwrap(), None, &SourceKind::ALL, results)
    }

    fn criteria(budget: f64, location_type: LocationType) -> SearchCriteria {
        SearchCriteria::new(budget, location_type, HardConstraints::default()).unwrap()
    }

    #[test]
    fn rent_budget_compares_monthly_rent() {
        let rec = record(Some(1500.0), Some(300_000.0), None);
        assert!(criteria(2000.0, LocationType::Rent).check(&rec).is_ok());
        let reason = criteria(1200.0, LocationType::Rent).check(&rec).unwrap_err();
        assert!(reason.starts_with("Over budget"));
    }

    #[test]
    fn buy_budget_compares_purchase_price() {
        let rec = record(Some(1500.0), Some(450_000.0), None);
        assert!(criteria(500_000.0, LocationType::Buy).check(&rec).is_ok());
        assert!(criteria(400_000.0, LocationType::Buy).check(&rec).is_err());
    }

    #[test]
    fn unknown_price_passes_budget() {
        let rec = record(None, None, None);
        assert!(criteria(100.0, LocationType::Rent).check(&rec).is_ok());
    }

    #[test]
    fn commute_limit_applies_only_with_commute_data() {
        let constraints = HardConstraints {
            max_commute_minutes: Some(30.0),
            ..Default::default()
        };
        let criteria = SearchCriteria::new(5000.0, LocationType::Rent, constraints).unwrap();

        assert!(criteria.check(&record(Some(1000.0), None, Some(45.0))).is_err());
        assert!(criteria.check(&record(Some(1000.0), None, Some(20.0))).is_ok());
        assert!(criteria.check(&record(Some(1000.0), None, None)).is_ok());
    }

    #[test]
    fn non_positive_budget_is_rejected() {
        assert!(SearchCriteria::new(0.0, LocationType::Rent, HardConstraints::default()).is_err());
        assert!(SearchCriteria::new(f64::NAN, LocationType::Buy, HardConstraints::default()).is_err());
    }

    #[test]
    fn location_type_parses_lowercase() {
        let lt: LocationType = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(lt, LocationType::Buy);
    }
}
