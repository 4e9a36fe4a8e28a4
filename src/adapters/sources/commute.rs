//! Transit journey planner source.
//!
//! `GET {base}/Journey/JourneyResults/{from}/to/{to}?app_key=` using
//! gazetteer coordinates for both ends. Requires a destination.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::enrichment::{CommuteSnapshot, SourceData, SourceErrorKind, SourceKind};
use crate::domain::foundation::Coordinates;
use crate::domain::scoring::normalization::accessibility_from_changes;
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{centroid_of, map_send_error, read_json, HttpSourceConfig};

/// Journey planner API client.
pub struct CommuteSource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl CommuteSource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self { config, client }
    }
}

#[derive(Debug, Deserialize)]
struct JourneyResponse {
    #[serde(default)]
    journeys: Vec<Journey>,
}

#[derive(Debug, Deserialize)]
struct Journey {
    duration: f64,
    #[serde(default)]
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    mode: Mode,
}

#[derive(Debug, Default, Deserialize)]
struct Mode {
    #[serde(default)]
    name: String,
}

fn location(coords: Coordinates) -> String {
    format!("{:.4},{:.4}", coords.lat, coords.lon)
}

fn normalize(
    raw: JourneyResponse,
    origin: &str,
    destination: &str,
) -> Result<CommuteSnapshot, SourceError> {
    let journey = raw
        .journeys
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::invalid_response("No journeys in response"))?;

    let changes = journey.legs.len().saturating_sub(1) as u32;
    let walking_minutes = journey
        .legs
        .iter()
        .filter(|leg| leg.mode.name == "walking")
        .map(|leg| leg.duration)
        .sum();

    Ok(CommuteSnapshot {
        origin: origin.to_string(),
        destination: destination.to_string(),
        duration_minutes: journey.duration,
        changes,
        walking_minutes,
        accessibility_score: accessibility_from_changes(changes),
    })
}

#[async_trait]
impl SourceProvider for CommuteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Commute
    }

    fn requires_destination(&self) -> bool {
        true
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let destination = request
            .destination
            .as_deref()
            .ok_or_else(|| SourceError::new(SourceErrorKind::Skipped, "No destination"))?;

        let from = location(centroid_of(request.area_code.as_str())?);
        let to = location(centroid_of(destination)?);
        let url = format!(
            "{}/Journey/JourneyResults/{}/to/{}",
            self.config.base_url, from, to
        );

        let mut builder = self.client.get(url);
        if let Some(key) = self.config.api_key() {
            builder = builder.query(&[("app_key", key)]);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let raw: JourneyResponse = read_json(response).await?;
        normalize(raw, request.area_code.as_str(), destination).map(SourceData::Commute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::AreaCode;

    #[test]
    fn counts_changes_and_walking_time() {
        let raw: JourneyResponse = serde_json::from_str(
            r#"{"journeys": [{
                "duration": 34,
                "legs": [
                    {"duration": 6, "mode": {"name": "walking"}},
                    {"duration": 18, "mode": {"name": "tube"}},
                    {"duration": 7, "mode": {"name": "bus"}},
                    {"duration": 3, "mode": {"name": "walking"}}
                ]
            }]}"#,
        )
        .unwrap();

        let snapshot = normalize(raw, "E1", "UCL").unwrap();

        assert_eq!(snapshot.duration_minutes, 34.0);
        assert_eq!(snapshot.changes, 3);
        assert_eq!(snapshot.walking_minutes, 9.0);
        assert_eq!(snapshot.accessibility_score, 40.0);
        assert_eq!(snapshot.destination, "UCL");
    }

    #[test]
    fn empty_journey_list_is_invalid() {
        let raw: JourneyResponse = serde_json::from_str(r#"{"journeys": []}"#).unwrap();
        let err = normalize(raw, "E1", "UCL").unwrap_err();
        assert_eq!(err.kind, SourceErrorKind::InvalidResponse);
    }

    #[test]
    fn locations_are_coordinate_pairs() {
        assert_eq!(location(Coordinates::new(51.5074, -0.1278)), "51.5074,-0.1278");
    }

    #[tokio::test]
    async fn unknown_area_is_not_found_without_a_request() {
        let source = CommuteSource::new(HttpSourceConfig::new("http://127.0.0.1:9"));
        let request = SourceRequest::new(AreaCode::new("ZZ9").unwrap()).with_destination("UCL");

        let err = source.fetch(&request).await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert!(err.message.contains("ZZ9"));
    }

    #[tokio::test]
    async fn unknown_destination_is_not_found() {
        let source = CommuteSource::new(HttpSourceConfig::new("http://127.0.0.1:9"));
        let request = SourceRequest::new(AreaCode::new("E1").unwrap()).with_destination("Narnia");

        let err = source.fetch(&request).await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
    }
}
