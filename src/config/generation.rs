//! Video generation configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::generation::VideoProviderKind;

use super::error::ValidationError;

/// Credentials for one generation provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    /// Provider is skipped when unset
    pub api_key: Option<Secret<String>>,

    pub base_url: Option<String>,
}

/// Video generation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub veo: ProviderSettings,
    #[serde(default)]
    pub sora: ProviderSettings,
    #[serde(default)]
    pub ltx: ProviderSettings,
    #[serde(default)]
    pub nano: ProviderSettings,

    /// Per-attempt timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Fallback order (comma-separated)
    #[serde(default = "default_provider_order")]
    pub provider_order: String,

    /// Lifetime of a cached video
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Pause before retrying the same provider
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl GenerationConfig {
    pub fn settings(&self, kind: VideoProviderKind) -> &ProviderSettings {
        match kind {
            VideoProviderKind::Veo => &self.veo,
            VideoProviderKind::Sora => &self.sora,
            VideoProviderKind::Ltx => &self.ltx,
            VideoProviderKind::Nano => &self.nano,
        }
    }

    pub fn base_url(&self, kind: VideoProviderKind) -> String {
        self.settings(kind)
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_base_url(kind).to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Parsed fallback order.
    pub fn provider_order_list(&self) -> Result<Vec<VideoProviderKind>, ValidationError> {
        let mut order = Vec::new();
        for name in self.provider_order.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let kind: VideoProviderKind = name
                .parse()
                .map_err(|_| ValidationError::UnknownProvider(name.to_string()))?;
            if !order.contains(&kind) {
                order.push(kind);
            }
        }
        if order.is_empty() {
            return Err(ValidationError::EmptyProviderOrder);
        }
        Ok(order)
    }

    /// Validate generation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout("generation.timeout_secs"));
        }
        if self.ttl_secs == 0 {
            return Err(ValidationError::InvalidTtl("generation.ttl_secs"));
        }
        self.provider_order_list()?;
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            veo: ProviderSettings::default(),
            sora: ProviderSettings::default(),
            ltx: ProviderSettings::default(),
            nano: ProviderSettings::default(),
            timeout_secs: default_timeout(),
            provider_order: default_provider_order(),
            ttl_secs: default_ttl(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_base_url(kind: VideoProviderKind) -> &'static str {
    match kind {
        VideoProviderKind::Veo => "https://ai.google.dev/api/veo/v1",
        VideoProviderKind::Sora => "https://api.openai.com/v1/video",
        VideoProviderKind::Ltx => "https://api.ltx.studio/v1",
        VideoProviderKind::Nano => "https://api.nano.video/v1",
    }
}

fn default_timeout() -> u64 {
    120
}

fn default_provider_order() -> String {
    "veo,sora,ltx,nano".to_string()
}

fn default_ttl() -> u64 {
    30 * 24 * 60 * 60
}

fn default_retry_delay_ms() -> u64 {
    1_000
}
