//! Scoring Module - Pure domain services for ranking areas.
//!
//! Turns enrichment records into a ranked, explained recommendation list
//! for one persona.
//!
//! # Components
//!
//! - `Factor` / `FactorScore` - Scoring dimensions on a common 0-100 scale
//! - `normalization` - Raw units and snapshots to factor scores
//! - `PersonaWeights` / `PersonaCatalog` - Validated weight vectors
//! - `SearchCriteria` - Budget and hard constraints, applied before scoring
//! - `ScoringEngine` - Composite scores, deterministic ranking, highlights
//!
//! No I/O happens here; everything is a function of its inputs.

mod constraints;
mod engine;
mod factor;
pub mod normalization;
mod persona;

pub use constraints::{FilteredArea, HardConstraints, LocationType, SearchCriteria};
pub use engine::{
    AreaFactors, FactorHighlight, RecommendationItem, ScoredSet, ScoringEngine, TradeOffs,
    QUARTILE_MIN_SET_SIZE, TRADE_OFF_MARGIN,
};
pub use factor::{Factor, FactorScore};
pub use persona::{
    ImportanceRatings, PersonaCatalog, PersonaError, PersonaWeights, NEUTRAL_IMPORTANCE,
    WEIGHT_SUM_EPSILON,
};
