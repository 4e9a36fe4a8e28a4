//! Cache store adapters.
//!
//! - `InMemoryCacheStore` - Process-local map with lazy expiry, for tests and single-server use
//! - `RedisCacheStore` - Redis-backed for production multi-server

mod in_memory;
mod redis;

pub use in_memory::InMemoryCacheStore;
pub use self::redis::RedisCacheStore;
