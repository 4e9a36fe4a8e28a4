//! Video Provider Port - Interface for generation backends.
//!
//! All providers share one request/response contract so the fallback chain
//! can treat them interchangeably.

use async_trait::async_trait;

use crate::domain::generation::{GenerationRequest, ProviderOutput, VideoProviderKind};

/// Port for a single video generation backend.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    fn kind(&self) -> VideoProviderKind;

    /// Renders one clip. `duration_secs` is already clamped to the
    /// provider's maximum.
    async fn generate(
        &self,
        request: &GenerationRequest,
        duration_secs: u32,
    ) -> Result<ProviderOutput, GenerationError>;
}

/// Errors from generation providers and the fallback chain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Provider is down or returned 5xx.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    /// Provider refused the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The chain attempted a step its state machine does not allow.
    #[error("invalid generation state: {0}")]
    InvalidState(String),

    /// Every provider in the chain failed.
    #[error("all providers exhausted after trying {attempted:?}: {last_error}")]
    AllProvidersExhausted {
        attempted: Vec<VideoProviderKind>,
        last_error: String,
    },
}

impl GenerationError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Maps a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::AuthenticationFailed,
            408 | 504 => Self::Timeout { timeout_secs: 0 },
            429 => Self::RateLimited {
                retry_after_secs: 60,
            },
            500..=599 => Self::unavailable(format!("HTTP {}: {}", status, body)),
            _ => Self::InvalidRequest(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Transient classes worth one retry on the same provider.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unavailable { .. } | Self::Network(_) | Self::Timeout { .. }
        )
    }
}
