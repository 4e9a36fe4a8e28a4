//! HTTP Video Provider - one generation backend behind a shared JSON contract.
//!
//! Every backend is reached the same way:
//!
//! ```text
//! POST {base_url}/generate
//! Authorization: Bearer {api_key}
//! { "prompt": "...", "duration_seconds": 30, "persona": "student", "area_code": "E2" }
//! ```
//!
//! and answers with `{ "video_url": "...", "duration_seconds": 30, "cost_usd": 4.5 }`.
//! Missing `duration_seconds` falls back to the requested duration; missing
//! `cost_usd` is estimated from the provider profile by the chain.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::generation::{GenerationRequest, ProviderOutput, VideoProviderKind};
use crate::ports::{GenerationError, VideoProvider};

/// Default request timeout; renders are slow.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for one HTTP generation backend.
#[derive(Debug, Clone)]
pub struct HttpVideoProviderConfig {
    pub kind: VideoProviderKind,
    api_key: Secret<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpVideoProviderConfig {
    pub fn new(kind: VideoProviderKind, api_key: Secret<String>, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// `VideoProvider` over HTTP.
pub struct HttpVideoProvider {
    config: HttpVideoProviderConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: String,
    duration_seconds: u32,
    persona: &'a str,
    area_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(alias = "url")]
    video_url: Option<String>,
    duration_seconds: Option<u32>,
    cost_usd: Option<f64>,
}

impl HttpVideoProvider {
    pub fn new(config: HttpVideoProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, client }
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.config.base_url)
    }

    fn map_send_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if err.is_connect() {
            GenerationError::network(format!("Connection failed: {}", err))
        } else {
            GenerationError::network(err.to_string())
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, GenerationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GenerationError::from_status(status.as_u16(), body))
    }
}

/// Turns a decoded body into provider output.
fn parse_output(raw: GenerateResponse, requested_secs: u32) -> Result<ProviderOutput, GenerationError> {
    let artifact_url = raw
        .video_url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| GenerationError::parse("response has no video_url"))?;

    Ok(ProviderOutput {
        artifact_url,
        duration_secs: raw.duration_seconds.unwrap_or(requested_secs),
        cost_usd: raw.cost_usd.filter(|c| c.is_finite() && *c >= 0.0),
    })
}

#[async_trait]
impl VideoProvider for HttpVideoProvider {
    fn kind(&self) -> VideoProviderKind {
        self.config.kind
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        duration_secs: u32,
    ) -> Result<ProviderOutput, GenerationError> {
        let body = GenerateBody {
            prompt: request.prompt(),
            duration_seconds: duration_secs,
            persona: request.persona.as_str(),
            area_code: request.area_code().as_str(),
        };

        let response = self
            .client
            .post(self.generate_url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = self.handle_response_status(response).await?;
        let raw: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::parse(format!("Failed to parse response: {}", e)))?;

        parse_output(raw, duration_secs)
    }
}
