//! Data source identities, failure classes and provenance.

use serde::{Deserialize, Serialize};
use std::fmt;

const HOUR: u64 = 3600;
const DAY: u64 = 24 * HOUR;

/// One external data source feeding area enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Property intelligence (affordability, investment, prices). Critical.
    Property,
    /// Public transport journey to the caller's destination.
    Commute,
    /// Street-level crime statistics.
    Crime,
    /// School counts and ratings.
    Schools,
    /// Amenity and nightlife density.
    Amenities,
    /// Geographic boundaries and centroid.
    Geography,
    /// Real-time research summary.
    Research,
}

impl SourceKind {
    /// Every source, in enrichment order.
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Property,
        SourceKind::Commute,
        SourceKind::Crime,
        SourceKind::Schools,
        SourceKind::Amenities,
        SourceKind::Geography,
        SourceKind::Research,
    ];

    /// The one source without which an area cannot be scored.
    pub fn is_critical(&self) -> bool {
        matches!(self, SourceKind::Property)
    }

    /// Stable lowercase name used in cache keys, logs and API responses.
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Property => "property",
            SourceKind::Commute => "commute",
            SourceKind::Crime => "crime",
            SourceKind::Schools => "schools",
            SourceKind::Amenities => "amenities",
            SourceKind::Geography => "geography",
            SourceKind::Research => "research",
        }
    }

    /// Cache lifetime, inversely proportional to how volatile the source is.
    pub fn default_ttl_secs(&self) -> u64 {
        match self {
            SourceKind::Property => DAY,
            SourceKind::Commute => 7 * DAY,
            SourceKind::Crime => 30 * DAY,
            SourceKind::Schools => 90 * DAY,
            SourceKind::Amenities => DAY,
            SourceKind::Geography => 90 * DAY,
            SourceKind::Research => 6 * HOUR,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a source produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    /// Credentials rejected (401/403).
    Auth,
    /// Source has nothing for this key (404).
    NotFound,
    /// Source throttled the request (429).
    RateLimited,
    /// Source failed (5xx).
    ServerError,
    /// No response within the adapter or request deadline.
    Timeout,
    /// Connection-level failure.
    Network,
    /// Payload could not be normalised.
    InvalidResponse,
    /// Source not applicable to this request (e.g. commute without destination).
    Skipped,
}

impl SourceErrorKind {
    /// Transient classes worth one retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SourceErrorKind::ServerError | SourceErrorKind::Timeout | SourceErrorKind::Network
        )
    }

    /// Maps an HTTP status code onto an error class.
    ///
    /// Returns `None` for success codes.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 | 403 => Some(SourceErrorKind::Auth),
            404 | 410 => Some(SourceErrorKind::NotFound),
            408 | 504 => Some(SourceErrorKind::Timeout),
            429 => Some(SourceErrorKind::RateLimited),
            500..=599 => Some(SourceErrorKind::ServerError),
            _ => Some(SourceErrorKind::InvalidResponse),
        }
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceErrorKind::Auth => "auth",
            SourceErrorKind::NotFound => "not_found",
            SourceErrorKind::RateLimited => "rate_limited",
            SourceErrorKind::ServerError => "server_error",
            SourceErrorKind::Timeout => "timeout",
            SourceErrorKind::Network => "network",
            SourceErrorKind::InvalidResponse => "invalid_response",
            SourceErrorKind::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Where a value used in scoring came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Fetched from the source during this request.
    Fresh,
    /// Served from the cache store.
    Cached,
    /// Source unavailable; neutral default used.
    Defaulted,
}
