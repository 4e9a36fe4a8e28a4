//! Shared HTTP plumbing for source providers.

use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::enrichment::SourceErrorKind;
use crate::domain::foundation::{Coordinates, Gazetteer};
use crate::ports::SourceError;

/// Connection settings for one external source.
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpSourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_key(mut self, key: Secret<String>) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    /// Builds a client with this source's timeout.
    pub(crate) fn client(&self) -> Client {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|_| Client::new())
    }
}

/// Classifies a transport failure.
pub(crate) fn map_send_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::timeout(err.to_string())
    } else if err.is_connect() {
        SourceError::network(format!("Connection failed: {}", err))
    } else if err.is_decode() {
        SourceError::invalid_response(err.to_string())
    } else {
        SourceError::network(err.to_string())
    }
}

/// Gazetteer centroid for a place, or `NotFound` when the table has none.
pub(crate) fn centroid_of(name: &str) -> Result<Coordinates, SourceError> {
    Gazetteer::centroid(name).ok_or_else(|| {
        SourceError::new(
            SourceErrorKind::NotFound,
            format!("no known coordinates for '{}'", name),
        )
    })
}

/// Checks the status and decodes a JSON body.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SourceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SourceError::from_status(status.as_u16(), body));
    }

    response
        .json()
        .await
        .map_err(|e| SourceError::invalid_response(format!("Failed to parse response: {}", e)))
}
