//! HTTP adapter - REST API over the application handlers.

pub mod dto;
mod error;
mod handlers;
mod routes;

pub use error::{ApiError, ErrorResponse};
pub use handlers::AppState;
pub use routes::api_router;
