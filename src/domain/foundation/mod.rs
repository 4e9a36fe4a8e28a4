//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the Area Scout domain.

mod errors;
mod gazetteer;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use gazetteer::{Coordinates, Gazetteer, Place};
pub use ids::{AreaCode, PersonaId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
