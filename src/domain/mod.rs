//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, gazetteer)
//! - `enrichment` - Source identities, normalised snapshots and per-area records
//! - `scoring` - Factors, personas, constraints and the ranking engine
//! - `generation` - Video provider profiles and the fallback state machine

pub mod enrichment;
pub mod foundation;
pub mod generation;
pub mod scoring;
