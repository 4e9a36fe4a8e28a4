//! Generation adapters - video providers, the fallback chain and cost tracking.

mod fallback_chain;
mod http_provider;
mod in_memory_cost_tracker;
mod mock_provider;

pub use fallback_chain::{
    events, GenerationEventCallback, NoOpEventCallback, VideoGenerationChain, DEFAULT_RETRY_DELAY,
};
pub use http_provider::{HttpVideoProvider, HttpVideoProviderConfig, DEFAULT_GENERATION_TIMEOUT};
pub use in_memory_cost_tracker::InMemoryCostTracker;
pub use mock_provider::{MockCall, MockError, MockResponse, MockVideoProvider};
