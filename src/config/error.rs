//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid timeout for {0}: must be 1-300 seconds")]
    InvalidTimeout(&'static str),

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Invalid TTL for {0}: must be non-zero")]
    InvalidTtl(&'static str),

    #[error("Cached-path deadline exceeds cold-path deadline")]
    InvalidDeadlines,

    #[error("Cold-path enrichment deadline must be shorter than the server request timeout")]
    DeadlineExceedsRequestTimeout,

    #[error("max_candidates must be between 1 and 20")]
    InvalidMaxCandidates,

    #[error("{0} must be at least 1")]
    MustBePositive(&'static str),

    #[error("Invalid area code in {field}: {value}")]
    InvalidAreaCode { field: &'static str, value: String },

    #[error("Unknown video provider: {0}")]
    UnknownProvider(String),

    #[error("Provider order is empty")]
    EmptyProviderOrder,

    #[error("Invalid base URL for {0}")]
    InvalidBaseUrl(&'static str),
}
