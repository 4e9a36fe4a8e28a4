//! Video generation providers and their cost/quality profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A generation backend in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoProviderKind {
    Veo,
    Sora,
    Ltx,
    Nano,
}

/// Relative output quality of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Basic,
    Medium,
    High,
    Premium,
}

/// Static pricing and limits for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProviderProfile {
    pub cost_per_second_usd: f64,
    pub quality: Quality,
    pub max_duration_secs: u32,
}

impl VideoProviderKind {
    /// Default priority, best quality/cost trade-off first.
    pub const DEFAULT_ORDER: [VideoProviderKind; 4] = [
        VideoProviderKind::Veo,
        VideoProviderKind::Sora,
        VideoProviderKind::Ltx,
        VideoProviderKind::Nano,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VideoProviderKind::Veo => "veo",
            VideoProviderKind::Sora => "sora",
            VideoProviderKind::Ltx => "ltx",
            VideoProviderKind::Nano => "nano",
        }
    }

    pub fn profile(&self) -> ProviderProfile {
        match self {
            VideoProviderKind::Veo => ProviderProfile {
                cost_per_second_usd: 0.15,
                quality: Quality::High,
                max_duration_secs: 60,
            },
            VideoProviderKind::Sora => ProviderProfile {
                cost_per_second_usd: 0.30,
                quality: Quality::Premium,
                max_duration_secs: 60,
            },
            VideoProviderKind::Ltx => ProviderProfile {
                cost_per_second_usd: 0.10,
                quality: Quality::Medium,
                max_duration_secs: 45,
            },
            VideoProviderKind::Nano => ProviderProfile {
                cost_per_second_usd: 0.05,
                quality: Quality::Basic,
                max_duration_secs: 30,
            },
        }
    }

    /// Requested duration limited to what this provider can render.
    pub fn clamp_duration(&self, requested_secs: u32) -> u32 {
        requested_secs.clamp(1, self.profile().max_duration_secs)
    }

    /// List-price estimate for a clip of the given length.
    pub fn estimate_cost_usd(&self, duration_secs: u32) -> f64 {
        self.profile().cost_per_second_usd * f64::from(self.clamp_duration(duration_secs))
    }
}

impl fmt::Display for VideoProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VideoProviderKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::DEFAULT_ORDER
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                ValidationError::invalid_format("provider", format!("unknown provider '{}'", s))
            })
    }
}

/// Attempt order: the preferred provider first, then `base` in order,
/// without duplicates.
pub fn provider_order(
    preferred: Option<VideoProviderKind>,
    base: &[VideoProviderKind],
) -> Vec<VideoProviderKind> {
    let mut order = Vec::with_capacity(base.len() + 1);
    for provider in preferred.into_iter().chain(base.iter().copied()) {
        if !order.contains(&provider) {
            order.push(provider);
        }
    }
    order
}
