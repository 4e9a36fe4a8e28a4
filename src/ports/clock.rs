//! Clock Port - Source of the current time.
//!
//! Injected wherever expiry is computed so tests can move time by hand.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
