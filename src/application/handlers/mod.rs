//! Application handlers.
//!
//! Query and command handlers that orchestrate enrichment, scoring and
//! generation over the ports.

mod cache_admin;
mod cache_warmer;
mod generate_video;
mod get_area_profile;
mod get_recommendations;

pub use cache_admin::CacheAdminHandler;
pub use cache_warmer::{CacheWarmer, WarmReport};
pub use generate_video::{GenerateVideoCommand, GenerateVideoError, GenerateVideoHandler};
pub use get_area_profile::{GetAreaProfileHandler, GetAreaProfileQuery};
pub use get_recommendations::{
    FilteredSummary, GetRecommendationsHandler, GetRecommendationsQuery, RecommendationError,
    RecommendationMetadata, RecommendationResponse, RecommendationSettings, FILTERED_EXAMPLES,
};
