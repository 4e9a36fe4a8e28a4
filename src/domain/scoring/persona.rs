//! Persona weight vectors and the catalog they are loaded into.
//!
//! Weights are validated once when the catalog is built. A catalog with any
//! invalid persona is rejected as a whole, so requests never see a weight
//! vector that does not sum to 1.0.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::domain::foundation::{PersonaId, ValidationError};

use super::Factor;

/// Allowed deviation of a weight vector's sum from 1.0.
pub const WEIGHT_SUM_EPSILON: f64 = 0.001;

/// Neutral user importance rating on the 0-10 scale.
pub const NEUTRAL_IMPORTANCE: f64 = 5.0;

/// User importance ratings per factor (0-10, missing means neutral).
pub type ImportanceRatings = BTreeMap<Factor, f64>;

/// Persona configuration defects. Fatal at load time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PersonaError {
    #[error("persona '{persona}' weights sum to {sum:.3}, expected 1.0 ± 0.001")]
    InvalidWeightSum { persona: String, sum: f64 },

    #[error("persona '{persona}' has negative weight {weight} for {factor}")]
    NegativeWeight {
        persona: String,
        factor: Factor,
        weight: f64,
    },

    #[error("persona '{persona}' has no weights")]
    EmptyWeights { persona: String },

    #[error("persona '{persona}' references unknown factor '{factor}'")]
    UnknownFactor { persona: String, factor: String },

    #[error("invalid persona id: {0}")]
    InvalidId(#[from] ValidationError),

    #[error("failed to read persona file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse persona file: {0}")]
    Parse(String),

    #[error("persona catalog is empty")]
    EmptyCatalog,
}

/// A validated weight vector for one persona.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaWeights {
    persona_id: PersonaId,
    weights: BTreeMap<Factor, f64>,
}

impl PersonaWeights {
    /// Validates and creates a weight vector.
    ///
    /// Zero weights are dropped; the remaining weights must be non-negative
    /// and sum to 1.0 within [`WEIGHT_SUM_EPSILON`].
    pub fn new(
        persona_id: PersonaId,
        weights: impl IntoIterator<Item = (Factor, f64)>,
    ) -> Result<Self, PersonaError> {
        let mut kept = BTreeMap::new();
        for (factor, weight) in weights {
            if weight < 0.0 || weight.is_nan() {
                return Err(PersonaError::NegativeWeight {
                    persona: persona_id.to_string(),
                    factor,
                    weight,
                });
            }
            if weight > 0.0 {
                kept.insert(factor, weight);
            }
        }

        if kept.is_empty() {
            return Err(PersonaError::EmptyWeights {
                persona: persona_id.to_string(),
            });
        }

        let sum: f64 = kept.values().sum();
        if (sum - 1.0).abs() >= WEIGHT_SUM_EPSILON {
            return Err(PersonaError::InvalidWeightSum {
                persona: persona_id.to_string(),
                sum,
            });
        }

        Ok(Self {
            persona_id,
            weights: kept,
        })
    }

    pub fn persona_id(&self) -> &PersonaId {
        &self.persona_id
    }

    pub fn weights(&self) -> &BTreeMap<Factor, f64> {
        &self.weights
    }

    /// Weight of a factor, 0.0 when the persona ignores it.
    pub fn weight(&self, factor: Factor) -> f64 {
        self.weights.get(&factor).copied().unwrap_or(0.0)
    }

    /// Factors with a non-zero weight, in factor order.
    pub fn weighted_factors(&self) -> impl Iterator<Item = Factor> + '_ {
        self.weights.keys().copied()
    }

    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Rescales weights by user importance and renormalises to 1.0.
    ///
    /// Each weight is multiplied by `importance / 5`. Ratings must be in
    /// `[0, 10]`; factors the persona ignores stay ignored. If every
    /// weighted factor is rated 0 the base weights are returned unchanged.
    pub fn adjusted(&self, ratings: &ImportanceRatings) -> Result<Self, ValidationError> {
        for rating in ratings.values() {
            if !(0.0..=10.0).contains(rating) {
                return Err(ValidationError::out_of_range("importance", 0.0, 10.0, *rating));
            }
        }
        if ratings.is_empty() {
            return Ok(self.clone());
        }

        let scaled: BTreeMap<Factor, f64> = self
            .weights
            .iter()
            .map(|(factor, weight)| {
                let rating = ratings.get(factor).copied().unwrap_or(NEUTRAL_IMPORTANCE);
                (*factor, weight * rating / NEUTRAL_IMPORTANCE)
            })
            .collect();

        let total: f64 = scaled.values().sum();
        if total <= 0.0 {
            return Ok(self.clone());
        }

        Ok(Self {
            persona_id: self.persona_id.clone(),
            weights: scaled
                .into_iter()
                .filter(|(_, w)| *w > 0.0)
                .map(|(f, w)| (f, w / total))
                .collect(),
        })
    }
}

/// All personas available to the service, keyed by id.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaCatalog {
    personas: BTreeMap<PersonaId, PersonaWeights>,
}

impl PersonaCatalog {
    /// Builds a catalog; rejects an empty set.
    pub fn new(personas: impl IntoIterator<Item = PersonaWeights>) -> Result<Self, PersonaError> {
        let personas: BTreeMap<_, _> = personas
            .into_iter()
            .map(|p| (p.persona_id.clone(), p))
            .collect();
        if personas.is_empty() {
            return Err(PersonaError::EmptyCatalog);
        }
        Ok(Self { personas })
    }

    /// The default student/parent/developer catalog.
    pub fn builtin() -> Result<Self, PersonaError> {
        use Factor::*;
        let table: [(&str, &[(Factor, f64)]); 3] = [
            (
                "student",
                &[
                    (Affordability, 0.30),
                    (Commute, 0.25),
                    (Nightlife, 0.20),
                    (Amenities, 0.15),
                    (Safety, 0.10),
                ],
            ),
            (
                "parent",
                &[
                    (Affordability, 0.20),
                    (Commute, 0.15),
                    (Safety, 0.25),
                    (Amenities, 0.10),
                    (Schools, 0.30),
                ],
            ),
            (
                "developer",
                &[
                    (Affordability, 0.10),
                    (Commute, 0.05),
                    (Safety, 0.10),
                    (Amenities, 0.15),
                    (Schools, 0.20),
                    (Investment, 0.40),
                ],
            ),
        ];

        let personas = table
            .iter()
            .map(|(id, weights)| -> Result<PersonaWeights, PersonaError> {
                PersonaWeights::new(PersonaId::new(id)?, weights.iter().copied())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(personas)
    }

    /// Parses a YAML mapping of `persona -> factor -> weight`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PersonaError> {
        let raw: BTreeMap<String, BTreeMap<String, f64>> =
            serde_yaml::from_str(yaml).map_err(|e| PersonaError::Parse(e.to_string()))?;

        let mut personas = Vec::with_capacity(raw.len());
        for (name, weights) in raw {
            let persona_id = PersonaId::new(&name)?;
            let mut typed = Vec::with_capacity(weights.len());
            for (factor_name, weight) in weights {
                let factor: Factor =
                    factor_name
                        .parse()
                        .map_err(|_| PersonaError::UnknownFactor {
                            persona: name.clone(),
                            factor: factor_name.clone(),
                        })?;
                typed.push((factor, weight));
            }
            personas.push(PersonaWeights::new(persona_id, typed)?);
        }
        Self::new(personas)
    }

    /// Reads and validates a persona YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| PersonaError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn get(&self, persona_id: &PersonaId) -> Option<&PersonaWeights> {
        self.personas.get(persona_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &PersonaId> {
        self.personas.keys()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
