//! Geographic boundaries source (postcodes.io outcode lookup).
//!
//! `GET {base}/outcodes/{code}`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::enrichment::{GeographySnapshot, SourceData, SourceKind};
use crate::domain::foundation::Coordinates;
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{map_send_error, read_json, HttpSourceConfig};

/// Outcode lookup client.
pub struct GeographySource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl GeographySource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self { config, client }
    }
}

#[derive(Debug, Deserialize)]
struct OutcodeResponse {
    result: Option<Outcode>,
}

#[derive(Debug, Deserialize)]
struct Outcode {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    admin_district: Vec<String>,
    #[serde(default)]
    region: Vec<String>,
}

fn normalize(raw: OutcodeResponse) -> Result<GeographySnapshot, SourceError> {
    let outcode = raw
        .result
        .ok_or_else(|| SourceError::invalid_response("Outcode response has no result"))?;

    let (Some(lat), Some(lon)) = (outcode.latitude, outcode.longitude) else {
        return Err(SourceError::invalid_response("Outcode has no centroid"));
    };

    Ok(GeographySnapshot {
        centroid: Coordinates::new(lat, lon),
        district: outcode.admin_district.into_iter().next(),
        region: outcode.region.into_iter().next(),
    })
}

#[async_trait]
impl SourceProvider for GeographySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Geography
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let url = format!("{}/outcodes/{}", self.config.base_url, request.area_code);
        let response = self.client.get(url).send().await.map_err(map_send_error)?;
        let raw: OutcodeResponse = read_json(response).await?;
        normalize(raw).map(SourceData::Geography)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_district_and_region() {
        let raw: OutcodeResponse = serde_json::from_str(
            r#"{"status": 200, "result": {
                "outcode": "E1", "latitude": 51.5176, "longitude": -0.0618,
                "admin_district": ["Tower Hamlets", "City of London"],
                "region": ["London"]
            }}"#,
        )
        .unwrap();

        let snapshot = normalize(raw).unwrap();

        assert_eq!(snapshot.centroid, Coordinates::new(51.5176, -0.0618));
        assert_eq!(snapshot.district.as_deref(), Some("Tower Hamlets"));
        assert_eq!(snapshot.region.as_deref(), Some("London"));
    }

    #[test]
    fn missing_centroid_is_invalid() {
        let raw: OutcodeResponse =
            serde_json::from_str(r#"{"result": {"admin_district": []}}"#).unwrap();
        assert!(normalize(raw).is_err());
    }
}
