//! Mock video provider for testing.
//!
//! Responses are consumed in order; once the queue is empty every call
//! succeeds with a placeholder artifact. Supports injected delay and records
//! every call.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::generation::{GenerationRequest, ProviderOutput, VideoProviderKind};
use crate::ports::{GenerationError, VideoProvider};

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        artifact_url: String,
        cost_usd: Option<f64>,
    },
    Error(MockError),
}

/// Mock error types for exercising the fallback chain.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    InvalidRequest { message: String },
    Timeout { timeout_secs: u64 },
}

impl From<MockError> for GenerationError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => {
                GenerationError::RateLimited { retry_after_secs }
            }
            MockError::Unavailable { message } => GenerationError::unavailable(message),
            MockError::AuthenticationFailed => GenerationError::AuthenticationFailed,
            MockError::Network { message } => GenerationError::network(message),
            MockError::InvalidRequest { message } => GenerationError::InvalidRequest(message),
            MockError::Timeout { timeout_secs } => GenerationError::Timeout { timeout_secs },
        }
    }
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub area_code: String,
    pub persona: String,
    pub duration_secs: u32,
}

/// Configurable `VideoProvider` for tests.
#[derive(Debug, Clone)]
pub struct MockVideoProvider {
    kind: VideoProviderKind,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockVideoProvider {
    pub fn new(kind: VideoProviderKind) -> Self {
        Self {
            kind,
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a success with the given URL and no reported cost.
    pub fn with_success(self, artifact_url: impl Into<String>) -> Self {
        self.with_success_costing(artifact_url, None)
    }

    pub fn with_success_costing(self, artifact_url: impl Into<String>, cost_usd: Option<f64>) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            artifact_url: artifact_url.into(),
            cost_usd,
        });
        self
    }

    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Queues the same error `times` times.
    pub fn with_errors(self, error: MockError, times: usize) -> Self {
        {
            let mut responses = lock(&self.responses);
            for _ in 0..times {
                responses.push_back(MockResponse::Error(error.clone()));
            }
        }
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                artifact_url: format!("https://cdn.example.com/videos/mock_{}.mp4", self.kind),
                cost_usd: None,
            })
    }
}

#[async_trait]
impl VideoProvider for MockVideoProvider {
    fn kind(&self) -> VideoProviderKind {
        self.kind
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
        duration_secs: u32,
    ) -> Result<ProviderOutput, GenerationError> {
        lock(&self.calls).push(MockCall {
            area_code: request.area_code().to_string(),
            persona: request.persona.to_string(),
            duration_secs,
        });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                artifact_url,
                cost_usd,
            } => Ok(ProviderOutput {
                artifact_url,
                duration_secs,
                cost_usd,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }
}
