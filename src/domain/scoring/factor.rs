//! Scoring factors and the 0-100 factor score value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::enrichment::SourceKind;
use crate::domain::foundation::ValidationError;

/// One scoring dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Affordability,
    Investment,
    Commute,
    Safety,
    Schools,
    Amenities,
    Nightlife,
}

impl Factor {
    pub const ALL: [Factor; 7] = [
        Factor::Affordability,
        Factor::Investment,
        Factor::Commute,
        Factor::Safety,
        Factor::Schools,
        Factor::Amenities,
        Factor::Nightlife,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Affordability => "affordability",
            Factor::Investment => "investment",
            Factor::Commute => "commute",
            Factor::Safety => "safety",
            Factor::Schools => "schools",
            Factor::Amenities => "amenities",
            Factor::Nightlife => "nightlife",
        }
    }

    /// The source whose snapshot this factor is derived from.
    pub fn source(&self) -> SourceKind {
        match self {
            Factor::Affordability | Factor::Investment => SourceKind::Property,
            Factor::Commute => SourceKind::Commute,
            Factor::Safety => SourceKind::Crime,
            Factor::Schools => SourceKind::Schools,
            Factor::Amenities | Factor::Nightlife => SourceKind::Amenities,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Factor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Factor::ALL
            .into_iter()
            .find(|f| f.name() == wanted)
            .ok_or_else(|| ValidationError::invalid_format("factor", format!("unknown factor '{}'", s)))
    }
}

/// A factor value on the common 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorScore(f64);

impl FactorScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Midpoint used whenever the underlying source is unavailable.
    pub const NEUTRAL: Self = Self(50.0);

    /// Creates a score, clamping into `[0, 100]`. NaN becomes neutral.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::NEUTRAL;
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    /// Creates a score, returning error if out of range.
    pub fn try_new(value: f64) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::out_of_range(
                "factor_score",
                Self::MIN,
                Self::MAX,
                value,
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for FactorScore {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for FactorScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_score_clamps_into_range() {
        assert_eq!(FactorScore::new(-12.0).value(), 0.0);
        assert_eq!(FactorScore::new(140.0).value(), 100.0);
        assert_eq!(FactorScore::new(63.5).value(), 63.5);
    }

    #[test]
    fn factor_score_nan_is_neutral() {
        assert_eq!(FactorScore::new(f64::NAN), FactorScore::NEUTRAL);
    }

    #[test]
    fn factor_score_try_new_rejects_out_of_range() {
        assert!(FactorScore::try_new(100.5).is_err());
        assert!(FactorScore::try_new(0.0).is_ok());
    }

    #[test]
    fn factor_parses_from_name() {
        assert_eq!("Nightlife".parse::<Factor>().unwrap(), Factor::Nightlife);
        assert!("parking".parse::<Factor>().is_err());
    }

    #[test]
    fn factors_map_to_their_sources() {
        assert_eq!(Factor::Investment.source(), SourceKind::Property);
        assert_eq!(Factor::Nightlife.source(), SourceKind::Amenities);
        assert_eq!(Factor::Safety.source(), SourceKind::Crime);
    }
}
