//! Scripted source provider for tests and offline development.
//!
//! Responses come from, in order: the queue (consumed one per call), the
//! per-area table, then the default. Without a default an unscripted call
//! fails with `NotFound`.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::enrichment::{SourceData, SourceErrorKind, SourceKind};
use crate::domain::foundation::AreaCode;
use crate::ports::{SourceError, SourceProvider, SourceRequest};

/// A scripted outcome.
#[derive(Debug, Clone)]
pub enum StubResponse {
    Data(SourceData),
    Error(SourceErrorKind),
}

/// Configurable in-process `SourceProvider`.
#[derive(Debug, Clone)]
pub struct StubSourceProvider {
    kind: SourceKind,
    queue: Arc<Mutex<VecDeque<StubResponse>>>,
    by_area: Arc<Mutex<HashMap<AreaCode, StubResponse>>>,
    default: Option<StubResponse>,
    requires_destination: bool,
    delay: Duration,
    calls: Arc<Mutex<Vec<SourceRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl StubSourceProvider {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            queue: Arc::new(Mutex::new(VecDeque::new())),
            by_area: Arc::new(Mutex::new(HashMap::new())),
            default: None,
            requires_destination: kind == SourceKind::Commute,
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response.
    pub fn with_data(self, data: SourceData) -> Self {
        lock(&self.queue).push_back(StubResponse::Data(data));
        self
    }

    /// Queues a failure.
    pub fn with_error(self, kind: SourceErrorKind) -> Self {
        lock(&self.queue).push_back(StubResponse::Error(kind));
        self
    }

    /// Answers every call for `area` the same way.
    pub fn with_area(self, area: AreaCode, response: StubResponse) -> Self {
        lock(&self.by_area).insert(area, response);
        self
    }

    /// Answer for anything not otherwise scripted.
    pub fn with_default(mut self, response: StubResponse) -> Self {
        self.default = Some(response);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls(&self) -> Vec<SourceRequest> {
        lock(&self.calls).clone()
    }

    fn next_response(&self, area: &AreaCode) -> Option<StubResponse> {
        if let Some(queued) = lock(&self.queue).pop_front() {
            return Some(queued);
        }
        if let Some(scripted) = lock(&self.by_area).get(area) {
            return Some(scripted.clone());
        }
        self.default.clone()
    }
}

#[async_trait]
impl SourceProvider for StubSourceProvider {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn requires_destination(&self) -> bool {
        self.requires_destination
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        lock(&self.calls).push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response(&request.area_code) {
            Some(StubResponse::Data(data)) => Ok(data),
            Some(StubResponse::Error(kind)) => Err(SourceError::new(kind, "stubbed failure")),
            None => Err(SourceError::new(
                SourceErrorKind::NotFound,
                format!("no stub for {}", request.area_code),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::AmenitiesSnapshot;

    fn amenities(count: u32) -> SourceData {
        SourceData::Amenities(AmenitiesSnapshot {
            amenity_count: count,
            density_score: 50.0,
            nightlife_count: 0,
        })
    }

    fn request(area: &str) -> SourceRequest {
        SourceRequest::new(AreaCode::new(area).unwrap())
    }

    #[tokio::test]
    async fn queue_then_area_then_default() {
        let stub = StubSourceProvider::new(SourceKind::Amenities)
            .with_error(SourceErrorKind::ServerError)
            .with_area(AreaCode::new("E1").unwrap(), StubResponse::Data(amenities(1)))
            .with_default(StubResponse::Data(amenities(9)));

        assert!(stub.fetch(&request("E1")).await.is_err());
        assert_eq!(stub.fetch(&request("E1")).await.unwrap(), amenities(1));
        assert_eq!(stub.fetch(&request("N1")).await.unwrap(), amenities(9));
        assert_eq!(stub.call_count(), 3);
    }

    #[tokio::test]
    async fn unscripted_call_is_not_found() {
        let stub = StubSourceProvider::new(SourceKind::Crime);
        let err = stub.fetch(&request("E1")).await.unwrap_err();
        assert_eq!(err.kind, SourceErrorKind::NotFound);
    }
}
