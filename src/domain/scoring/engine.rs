//! Scoring engine - composite scores, ranking and highlights.
//!
//! Pure functions over enrichment records and a persona weight vector.
//! Output order is fully determined by the inputs: descending composite
//! score, ties broken by ascending area code.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::enrichment::{DataOrigin, EnrichmentRecord};
use crate::domain::foundation::AreaCode;

use super::normalization;
use super::{Factor, FactorScore, PersonaWeights};

/// Candidate sets smaller than this use absolute thresholds instead of quartiles.
pub const QUARTILE_MIN_SET_SIZE: usize = 4;

/// Absolute strength threshold for small candidate sets.
pub const SMALL_SET_STRENGTH: f64 = 75.0;

/// Absolute weakness threshold for small candidate sets.
pub const SMALL_SET_WEAKNESS: f64 = 40.0;

/// Minimum gap to the top item before a factor counts as a trade-off.
pub const TRADE_OFF_MARGIN: f64 = 5.0;

/// A factor name and its score, for downstream prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorHighlight {
    pub factor: Factor,
    pub score: FactorScore,
}

/// How an item differs from the rank-1 item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeOffs {
    pub better: Vec<FactorHighlight>,
    pub worse: Vec<FactorHighlight>,
}

/// Factor scores for one area before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaFactors {
    pub area_code: AreaCode,
    pub scores: BTreeMap<Factor, FactorScore>,
    pub origins: BTreeMap<Factor, DataOrigin>,
}

impl AreaFactors {
    /// Extracts every factor from a record.
    pub fn from_record(record: &EnrichmentRecord) -> Self {
        let mut scores = BTreeMap::new();
        let mut origins = BTreeMap::new();
        for factor in Factor::ALL {
            let (score, origin) = normalization::extract(record, factor);
            scores.insert(factor, score);
            origins.insert(factor, origin);
        }
        Self {
            area_code: record.area_code.clone(),
            scores,
            origins,
        }
    }

    /// Builds factors from explicit scores; unspecified factors are neutral
    /// and marked defaulted.
    pub fn from_scores(area_code: AreaCode, scores: impl IntoIterator<Item = (Factor, f64)>) -> Self {
        let given: BTreeMap<Factor, f64> = scores.into_iter().collect();
        let mut out = Self {
            area_code,
            scores: BTreeMap::new(),
            origins: BTreeMap::new(),
        };
        for factor in Factor::ALL {
            match given.get(&factor) {
                Some(value) => {
                    out.scores.insert(factor, FactorScore::new(*value));
                    out.origins.insert(factor, DataOrigin::Fresh);
                }
                None => {
                    out.scores.insert(factor, FactorScore::NEUTRAL);
                    out.origins.insert(factor, DataOrigin::Defaulted);
                }
            }
        }
        out
    }

    fn score(&self, factor: Factor) -> FactorScore {
        self.scores.get(&factor).copied().unwrap_or(FactorScore::NEUTRAL)
    }

    fn is_defaulted(&self, factor: Factor) -> bool {
        matches!(self.origins.get(&factor), None | Some(DataOrigin::Defaulted))
    }
}

/// One ranked area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationItem {
    pub rank: u32,
    pub area_code: AreaCode,
    pub composite_score: f64,
    pub factor_scores: BTreeMap<Factor, FactorScore>,
    /// `weight * score` for each weighted factor.
    pub contributions: BTreeMap<Factor, f64>,
    /// Whether each factor used fresh, cached or defaulted data.
    pub factor_sources: BTreeMap<Factor, DataOrigin>,
    pub strengths: Vec<FactorHighlight>,
    pub weaknesses: Vec<FactorHighlight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_offs: Option<TradeOffs>,
}

/// Ranked output plus the areas that could not be scored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredSet {
    pub items: Vec<RecommendationItem>,
    /// Areas whose critical source was unavailable, ascending.
    pub excluded: Vec<AreaCode>,
}

impl ScoredSet {
    /// True when candidates were supplied but every one was excluded.
    pub fn no_viable_areas(&self) -> bool {
        self.items.is_empty() && !self.excluded.is_empty()
    }

    /// Keeps the top `n` items; ranks stay 1..=n.
    pub fn truncate(&mut self, n: usize) {
        self.items.truncate(n);
    }
}

/// Stateless scoring and ranking.
pub struct ScoringEngine;

impl ScoringEngine {
    /// Scores and ranks records for a persona.
    ///
    /// Records without critical-source data are listed in `excluded` and
    /// never ranked. An empty input yields an empty set.
    pub fn score(records: &[EnrichmentRecord], weights: &PersonaWeights) -> ScoredSet {
        let (viable, excluded): (Vec<&EnrichmentRecord>, Vec<&EnrichmentRecord>) =
            records.iter().partition(|r| r.is_viable());

        let mut excluded: Vec<AreaCode> = excluded.into_iter().map(|r| r.area_code.clone()).collect();
        excluded.sort();

        let candidates = viable.into_iter().map(AreaFactors::from_record).collect();

        ScoredSet {
            items: Self::rank(candidates, weights),
            excluded,
        }
    }

    /// Ranks pre-extracted factor sets.
    pub fn rank(candidates: Vec<AreaFactors>, weights: &PersonaWeights) -> Vec<RecommendationItem> {
        let mut scored: Vec<(AreaFactors, f64)> = candidates
            .into_iter()
            .map(|c| {
                let composite = Self::composite(&c.scores, weights);
                (c, composite)
            })
            .collect();

        scored.sort_by(|(a, a_score), (b, b_score)| {
            b_score
                .total_cmp(a_score)
                .then_with(|| a.area_code.cmp(&b.area_code))
        });

        let distributions = Distributions::build(&scored, weights);

        let mut items: Vec<RecommendationItem> = scored
            .iter()
            .enumerate()
            .map(|(index, (factors, composite))| {
                let (strengths, weaknesses) = distributions.highlights(factors, weights);
                RecommendationItem {
                    rank: index as u32 + 1,
                    area_code: factors.area_code.clone(),
                    composite_score: *composite,
                    factor_scores: factors.scores.clone(),
                    contributions: weights
                        .weighted_factors()
                        .map(|f| (f, weights.weight(f) * factors.score(f).value()))
                        .collect(),
                    factor_sources: factors.origins.clone(),
                    strengths,
                    weaknesses,
                    trade_offs: None,
                }
            })
            .collect();

        Self::attach_trade_offs(&mut items, weights);
        items
    }

    /// `clamp(sum(weight * score), 0, 100)` over the persona's factors.
    pub fn composite(scores: &BTreeMap<Factor, FactorScore>, weights: &PersonaWeights) -> f64 {
        let sum: f64 = weights
            .weights()
            .iter()
            .map(|(factor, weight)| {
                weight * scores.get(factor).copied().unwrap_or(FactorScore::NEUTRAL).value()
            })
            .sum();
        sum.clamp(FactorScore::MIN, FactorScore::MAX)
    }

    fn attach_trade_offs(items: &mut [RecommendationItem], weights: &PersonaWeights) {
        let Some(top) = items.first().map(|i| i.factor_scores.clone()) else {
            return;
        };

        for item in items.iter_mut().skip(1) {
            let mut trade_offs = TradeOffs::default();
            for factor in weights.weighted_factors() {
                let mine = item.factor_scores.get(&factor).copied().unwrap_or_default();
                let theirs = top.get(&factor).copied().unwrap_or_default();
                let highlight = FactorHighlight { factor, score: mine };
                if mine.value() > theirs.value() + TRADE_OFF_MARGIN {
                    trade_offs.better.push(highlight);
                } else if mine.value() < theirs.value() - TRADE_OFF_MARGIN {
                    trade_offs.worse.push(highlight);
                }
            }
            item.trade_offs = Some(trade_offs);
        }
    }
}

/// Per-factor quartile thresholds across the candidate set.
struct Distributions {
    thresholds: BTreeMap<Factor, (f64, f64)>,
}

impl Distributions {
    fn build(scored: &[(AreaFactors, f64)], weights: &PersonaWeights) -> Self {
        let use_quartiles = scored.len() >= QUARTILE_MIN_SET_SIZE;
        let thresholds = weights
            .weighted_factors()
            .map(|factor| {
                if !use_quartiles {
                    return (factor, (SMALL_SET_WEAKNESS, SMALL_SET_STRENGTH));
                }
                let mut values: Vec<f64> = scored.iter().map(|(c, _)| c.score(factor).value()).collect();
                values.sort_by(f64::total_cmp);
                (factor, (quantile(&values, 0.25), quantile(&values, 0.75)))
            })
            .collect();
        Self { thresholds }
    }

    /// Strengths sit at or above the upper threshold, weaknesses at or below
    /// the lower one. With quartiles, a factor where every candidate scores
    /// the same is neither. Defaulted factors are never highlighted.
    fn highlights(
        &self,
        factors: &AreaFactors,
        weights: &PersonaWeights,
    ) -> (Vec<FactorHighlight>, Vec<FactorHighlight>) {
        let mut strengths = Vec::new();
        let mut weaknesses = Vec::new();

        for factor in weights.weighted_factors() {
            if factors.is_defaulted(factor) {
                continue;
            }
            let Some(&(low, high)) = self.thresholds.get(&factor) else {
                continue;
            };
            let score = factors.score(factor);
            let value = score.value();
            let highlight = FactorHighlight { factor, score };

            if value >= high && value > low {
                strengths.push(highlight);
            } else if value <= low && value < high {
                weaknesses.push(highlight);
            }
        }

        sort_highlights(&mut strengths, Ordering::Greater);
        sort_highlights(&mut weaknesses, Ordering::Less);
        (strengths, weaknesses)
    }
}

/// Strongest (or weakest) first, factor order on ties.
fn sort_highlights(highlights: &mut [FactorHighlight], first: Ordering) {
    highlights.sort_by(|a, b| {
        let by_score = a.score.value().total_cmp(&b.score.value());
        let by_score = if first == Ordering::Greater {
            by_score.reverse()
        } else {
            by_score
        };
        by_score.then_with(|| a.factor.cmp(&b.factor))
    });
}

/// Linearly interpolated quantile of sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => FactorScore::NEUTRAL.value(),
        1 => sorted[0],
        n => {
            let position = p * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let fraction = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}
