//! Cache configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::AreaCode;

use super::error::ValidationError;

/// Which cache store backs the service.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

/// Cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,

    /// Required when `backend = redis`
    pub redis_url: Option<String>,

    /// Lifetime of a composed recommendation response
    #[serde(default = "default_recommendation_ttl")]
    pub recommendation_ttl_secs: u64,

    /// Warm the cache on start-up and periodically
    #[serde(default = "default_warm_enabled")]
    pub warm_enabled: bool,

    #[serde(default = "default_warm_interval")]
    pub warm_interval_secs: u64,

    /// Areas to pre-fetch (comma-separated)
    #[serde(default = "default_warm_areas")]
    pub warm_areas: String,
}

impl CacheConfig {
    pub fn warm_interval(&self) -> Duration {
        Duration::from_secs(self.warm_interval_secs)
    }

    /// Parsed warm areas.
    pub fn warm_areas_list(&self) -> Result<Vec<AreaCode>, ValidationError> {
        self.warm_areas
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                AreaCode::new(s).map_err(|_| ValidationError::InvalidAreaCode {
                    field: "cache.warm_areas",
                    value: s.to_string(),
                })
            })
            .collect()
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == CacheBackend::Redis {
            let url = self
                .redis_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or(ValidationError::MissingRequired("CACHE__REDIS_URL"))?;
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        if self.recommendation_ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl("cache.recommendation_ttl_secs"));
        }
        if self.warm_interval_secs == 0 {
            return Err(ValidationError::MustBePositive("cache.warm_interval_secs"));
        }
        self.warm_areas_list()?;
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            redis_url: None,
            recommendation_ttl_secs: default_recommendation_ttl(),
            warm_enabled: default_warm_enabled(),
            warm_interval_secs: default_warm_interval(),
            warm_areas: default_warm_areas(),
        }
    }
}

fn default_recommendation_ttl() -> u64 {
    3600
}

fn default_warm_enabled() -> bool {
    true
}

fn default_warm_interval() -> u64 {
    86_400
}

fn default_warm_areas() -> String {
    "E1,E15,SE1,N1,SW1,W1,NW1".to_string()
}
