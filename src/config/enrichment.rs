//! Enrichment and recommendation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Deadlines and fan-out limits for enrichment.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Optional-source deadline when most data is expected from cache
    #[serde(default = "default_cached_deadline")]
    pub cached_deadline_secs: u64,

    /// Optional-source deadline for a cold fetch
    #[serde(default = "default_cold_deadline")]
    pub cold_deadline_secs: u64,

    /// Candidate areas per recommendation request
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Upper bound on concurrent source fetches across all areas
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Commute destination used when a request names none
    #[serde(default = "default_destination")]
    pub default_destination: Option<String>,

    #[serde(default = "default_max_areas")]
    pub default_max_areas: usize,
}

impl EnrichmentConfig {
    pub fn cached_deadline(&self) -> Duration {
        Duration::from_secs(self.cached_deadline_secs)
    }

    pub fn cold_deadline(&self) -> Duration {
        Duration::from_secs(self.cold_deadline_secs)
    }

    /// Areas enriched at once so that `areas * sources` stays within the task bound.
    pub fn area_concurrency(&self, source_count: usize) -> usize {
        (self.max_concurrent_tasks / source_count.max(1)).max(1)
    }

    /// Validate enrichment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, secs) in [
            ("enrichment.cached_deadline_secs", self.cached_deadline_secs),
            ("enrichment.cold_deadline_secs", self.cold_deadline_secs),
        ] {
            if secs == 0 || secs > 300 {
                return Err(ValidationError::InvalidTimeout(name));
            }
        }
        if self.cached_deadline_secs > self.cold_deadline_secs {
            return Err(ValidationError::InvalidDeadlines);
        }
        if self.max_candidates == 0 || self.max_candidates > 20 {
            return Err(ValidationError::InvalidMaxCandidates);
        }
        if self.max_concurrent_tasks == 0 {
            return Err(ValidationError::MustBePositive("enrichment.max_concurrent_tasks"));
        }
        if self.default_max_areas == 0 {
            return Err(ValidationError::MustBePositive("enrichment.default_max_areas"));
        }
        Ok(())
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            cached_deadline_secs: default_cached_deadline(),
            cold_deadline_secs: default_cold_deadline(),
            max_candidates: default_max_candidates(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            default_destination: default_destination(),
            default_max_areas: default_max_areas(),
        }
    }
}

fn default_cached_deadline() -> u64 {
    10
}

fn default_cold_deadline() -> u64 {
    30
}

fn default_max_candidates() -> usize {
    20
}

fn default_max_concurrent_tasks() -> usize {
    160
}

fn default_destination() -> Option<String> {
    Some("UCL".to_string())
}

fn default_max_areas() -> usize {
    5
}
