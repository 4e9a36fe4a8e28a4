//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cache` - Cache stores (in-memory, Redis)
//! - `clock` - System and manual clocks
//! - `sources` - External data sources behind the cached adapter
//! - `generation` - Video providers, the fallback chain and cost tracking
//! - `http` - REST API

pub mod cache;
pub mod clock;
pub mod generation;
pub mod http;
pub mod sources;

pub use cache::{InMemoryCacheStore, RedisCacheStore};
pub use clock::{ManualClock, SystemClock};
