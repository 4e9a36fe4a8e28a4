//! Source Adapter Port - One external data source per implementation.
//!
//! Two layers:
//!
//! - `SourceProvider` talks to the external API and normalises the payload.
//!   It may fail.
//! - `SourceAdapter` is what the orchestrator consumes. It never fails:
//!   every outcome, including errors, is a `SourceResult` value.

use async_trait::async_trait;

use crate::domain::enrichment::{SourceData, SourceErrorKind, SourceKind, SourceResult};
use crate::domain::foundation::AreaCode;

/// Normalised parameters for one source fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRequest {
    pub area_code: AreaCode,
    pub destination: Option<String>,
}

impl SourceRequest {
    pub fn new(area_code: AreaCode) -> Self {
        Self {
            area_code,
            destination: None,
        }
    }

    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        self.destination = if destination.trim().is_empty() {
            None
        } else {
            Some(destination)
        };
        self
    }
}

/// A failed provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct SourceError {
    pub kind: SourceErrorKind,
    pub message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Timeout, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Network, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidResponse, message)
    }

    /// Maps a non-success HTTP status.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let kind = SourceErrorKind::from_status(status).unwrap_or(SourceErrorKind::InvalidResponse);
        Self::new(kind, format!("HTTP {}: {}", status, body.into()))
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Raw access to one external source.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Whether the source can only answer with a destination (commute).
    fn requires_destination(&self) -> bool {
        false
    }

    /// Calls the external API once and normalises the response.
    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError>;
}

/// Cache-backed, failure-absorbing access to one source.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Always returns a result; failures are carried in `SourceResult::error`.
    async fn fetch(&self, request: &SourceRequest) -> SourceResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_classifies_errors() {
        assert_eq!(SourceError::from_status(401, "").kind, SourceErrorKind::Auth);
        assert_eq!(SourceError::from_status(404, "").kind, SourceErrorKind::NotFound);
        assert_eq!(SourceError::from_status(429, "").kind, SourceErrorKind::RateLimited);
        assert_eq!(SourceError::from_status(503, "").kind, SourceErrorKind::ServerError);
        assert_eq!(SourceError::from_status(418, "").kind, SourceErrorKind::InvalidResponse);
    }

    #[test]
    fn only_transient_errors_retry() {
        assert!(SourceError::from_status(502, "bad gateway").is_retryable());
        assert!(SourceError::timeout("slow").is_retryable());
        assert!(!SourceError::from_status(404, "").is_retryable());
        assert!(!SourceError::from_status(429, "").is_retryable());
    }

    #[test]
    fn blank_destination_is_none() {
        let request = SourceRequest::new(AreaCode::new("E1").unwrap()).with_destination("  ");
        assert!(request.destination.is_none());
    }
}
