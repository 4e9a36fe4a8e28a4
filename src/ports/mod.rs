//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `CacheStore` - Shared TTL key/value store (plus `CacheKey` builders)
//! - `Clock` - Current time, swappable in tests
//! - `SourceProvider` / `SourceAdapter` - External data sources
//! - `VideoProvider` - Generation backends in the fallback chain
//! - `CostTracker` - Generation spend

mod cache_store;
mod clock;
mod cost_tracker;
mod source_adapter;
mod video_provider;

pub use cache_store::{CacheError, CacheKey, CacheStats, CacheStore, CacheStoreExt};
pub use clock::Clock;
pub use cost_tracker::{CostRecord, CostSummary, CostTracker, CostTrackerError};
pub use source_adapter::{SourceAdapter, SourceError, SourceProvider, SourceRequest};
pub use video_provider::{GenerationError, VideoProvider};
