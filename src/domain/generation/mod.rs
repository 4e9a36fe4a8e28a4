//! Generation domain - provider profiles, requests and the fallback state machine.

mod provider;
mod request;
mod state;

pub use provider::{provider_order, ProviderProfile, Quality, VideoProviderKind};
pub use request::{
    GenerationRequest, GenerationResult, ProviderOutput, DEFAULT_DURATION_SECS, VIDEO_TTL_SECS,
};
pub use state::GenerationState;
