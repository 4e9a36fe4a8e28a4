//! Source adapters - one HTTP provider per external data source, plus the
//! cache-backed wrapper the orchestrator consumes.
//!
//! | Source | Upstream |
//! |--------|----------|
//! | property | property intelligence API |
//! | commute | journey planner |
//! | crime | street-level crime API |
//! | schools, amenities | Overpass |
//! | geography | postcode lookup |
//! | research | chat-completions research API |

mod amenities;
mod cached_adapter;
mod commute;
mod crime;
mod geography;
mod http;
mod overpass;
mod property;
mod research;
mod schools;
mod stub;

pub use amenities::AmenitiesSource;
pub use cached_adapter::{CachedSourceAdapter, DEFAULT_RETRY_BASE_DELAY, DEFAULT_SOURCE_TIMEOUT};
pub use commute::CommuteSource;
pub use crime::CrimeSource;
pub use geography::GeographySource;
pub use http::HttpSourceConfig;
pub use overpass::DEFAULT_RADIUS_M;
pub use property::PropertySource;
pub use research::ResearchSource;
pub use schools::SchoolsSource;
pub use stub::{StubResponse, StubSourceProvider};
