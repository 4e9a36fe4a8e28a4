//! External data source configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::enrichment::SourceKind;

use super::error::ValidationError;

/// Connection and caching settings for one source.
///
/// Every field is optional; unset values resolve to per-source defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub base_url: Option<String>,

    pub api_key: Option<Secret<String>>,

    pub timeout_secs: Option<u64>,

    /// Cache lifetime override
    pub ttl_secs: Option<u64>,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: None,
            ttl_secs: None,
            enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Settings for all seven sources
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub property: SourceSettings,
    #[serde(default)]
    pub commute: SourceSettings,
    #[serde(default)]
    pub crime: SourceSettings,
    #[serde(default)]
    pub schools: SourceSettings,
    #[serde(default)]
    pub amenities: SourceSettings,
    #[serde(default)]
    pub geography: SourceSettings,
    #[serde(default)]
    pub research: SourceSettings,

    /// Model name sent to the research API
    pub research_model: Option<String>,
}

impl SourcesConfig {
    pub fn settings(&self, kind: SourceKind) -> &SourceSettings {
        match kind {
            SourceKind::Property => &self.property,
            SourceKind::Commute => &self.commute,
            SourceKind::Crime => &self.crime,
            SourceKind::Schools => &self.schools,
            SourceKind::Amenities => &self.amenities,
            SourceKind::Geography => &self.geography,
            SourceKind::Research => &self.research,
        }
    }

    /// Sources that should be wired into enrichment.
    ///
    /// Property is always enabled.
    pub fn enabled_kinds(&self) -> Vec<SourceKind> {
        SourceKind::ALL
            .into_iter()
            .filter(|k| k.is_critical() || self.settings(*k).enabled)
            .collect()
    }

    pub fn base_url(&self, kind: SourceKind) -> String {
        self.settings(kind)
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_base_url(kind).to_string())
    }

    pub fn timeout(&self, kind: SourceKind) -> Duration {
        let secs = self.settings(kind).timeout_secs.unwrap_or(match kind {
            SourceKind::Research => 30,
            _ => 10,
        });
        Duration::from_secs(secs)
    }

    pub fn ttl_secs(&self, kind: SourceKind) -> u64 {
        self.settings(kind)
            .ttl_secs
            .unwrap_or_else(|| kind.default_ttl_secs())
    }

    /// Validate source configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        for kind in SourceKind::ALL {
            let settings = self.settings(kind);
            if let Some(url) = &settings.base_url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ValidationError::InvalidBaseUrl(kind.name()));
                }
            }
            if matches!(settings.timeout_secs, Some(t) if t == 0 || t > 300) {
                return Err(ValidationError::InvalidTimeout(kind.name()));
            }
            if settings.ttl_secs == Some(0) {
                return Err(ValidationError::InvalidTtl(kind.name()));
            }
        }
        Ok(())
    }
}

fn default_base_url(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Property => "https://api.scansan.com/v1",
        SourceKind::Commute => "https://api.tfl.gov.uk",
        SourceKind::Crime => "https://data.police.uk/api",
        SourceKind::Schools | SourceKind::Amenities => "https://overpass-api.de/api",
        SourceKind::Geography => "https://api.postcodes.io",
        SourceKind::Research => "https://api.perplexity.ai",
    }
}
