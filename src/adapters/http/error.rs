//! Error responses for the HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::{GenerateVideoError, RecommendationError};
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::ports::{CacheError, GenerationError};

/// JSON error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Recommendation(RecommendationError),
    Video(GenerateVideoError),
    Cache(CacheError),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<RecommendationError> for ApiError {
    fn from(err: RecommendationError) -> Self {
        Self::Recommendation(err)
    }
}

impl From<GenerateVideoError> for ApiError {
    fn from(err: GenerateVideoError) -> Self {
        Self::Video(err)
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        Self::Cache(err)
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::Validation(err)
            | ApiError::Recommendation(RecommendationError::InvalidRequest(err)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::ValidationFailed, err.to_string()),
            ),
            ApiError::Recommendation(err @ RecommendationError::UnknownPersona(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::UnknownPersona, err.to_string()),
            ),
            ApiError::Video(err @ GenerateVideoError::UnknownPersona(_)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::UnknownPersona, err.to_string()),
            ),
            ApiError::Video(err @ GenerateVideoError::AreaNotScorable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(ErrorCode::CriticalSourceUnavailable, err.to_string()),
            ),
            ApiError::Video(GenerateVideoError::Generation(err)) => generation_error(err),
            ApiError::Cache(err) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(ErrorCode::CacheError, err.to_string()),
            ),
        }
    }
}

fn generation_error(err: &GenerationError) -> (StatusCode, ErrorResponse) {
    match err {
        GenerationError::AllProvidersExhausted {
            attempted,
            last_error,
        } => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::new(ErrorCode::AllProvidersExhausted, err.to_string()).with_details(
                serde_json::json!({
                    "attempted": attempted,
                    "lastError": last_error,
                }),
            ),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::new(ErrorCode::InternalError, other.to_string()),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::warn!(code = %body.code, message = %body.message, "Request failed");
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AreaCode, PersonaId};
    use crate::domain::generation::VideoProviderKind;

    #[test]
    fn unknown_persona_maps_to_400() {
        let err = ApiError::from(RecommendationError::UnknownPersona(
            PersonaId::new("pirate").unwrap(),
        ));
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "UNKNOWN_PERSONA");
    }

    #[test]
    fn invalid_request_maps_to_validation_failed() {
        let err = ApiError::from(RecommendationError::InvalidRequest(
            ValidationError::out_of_range("budget", 0.0, f64::MAX, -1.0),
        ));
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_FAILED");
    }

    #[test]
    fn exhausted_chain_maps_to_502_with_details() {
        let err = ApiError::from(GenerateVideoError::Generation(
            GenerationError::AllProvidersExhausted {
                attempted: vec![VideoProviderKind::Veo, VideoProviderKind::Nano],
                last_error: "provider unavailable: down".to_string(),
            },
        ));
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "ALL_PROVIDERS_EXHAUSTED");
        let details = body.details.unwrap();
        assert_eq!(details["attempted"], serde_json::json!(["veo", "nano"]));
    }

    #[test]
    fn unscorable_area_maps_to_503() {
        let err = ApiError::from(GenerateVideoError::AreaNotScorable(AreaCode::new("E1").unwrap()));
        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, "CRITICAL_SOURCE_UNAVAILABLE");
    }

    #[test]
    fn error_response_omits_empty_details() {
        let body = ErrorResponse::new(ErrorCode::CacheError, "down");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("details").is_none());
    }
}
