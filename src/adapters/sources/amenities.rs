//! Amenities source, via Overpass counts of everyday venues.

use async_trait::async_trait;

use crate::domain::enrichment::{AmenitiesSnapshot, SourceData, SourceKind};
use crate::domain::scoring::normalization::density_from_amenity_count;
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{centroid_of, HttpSourceConfig};
use super::overpass::{self, OverpassResponse, DEFAULT_RADIUS_M};

const FILTERS: [&str; 3] = [
    "[\"amenity\"~\"cafe|restaurant|pub|bar|nightclub\"]",
    "[\"shop\"~\"supermarket|convenience\"]",
    "[\"leisure\"~\"fitness_centre|sports_centre|park\"]",
];

const NIGHTLIFE: [&str; 3] = ["pub", "bar", "nightclub"];

/// Overpass-backed amenities client.
pub struct AmenitiesSource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl AmenitiesSource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self { config, client }
    }
}

fn normalize(raw: OverpassResponse) -> AmenitiesSnapshot {
    let amenity_count = raw.elements.len() as u32;
    let nightlife_count = raw
        .elements
        .iter()
        .filter(|e| e.tag("amenity").is_some_and(|a| NIGHTLIFE.contains(&a)))
        .count() as u32;

    AmenitiesSnapshot {
        amenity_count,
        density_score: density_from_amenity_count(amenity_count),
        nightlife_count,
    }
}

#[async_trait]
impl SourceProvider for AmenitiesSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Amenities
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let centroid = centroid_of(request.area_code.as_str())?;
        let query = overpass::around_query(&FILTERS, DEFAULT_RADIUS_M, centroid);
        let raw = overpass::run(&self.client, &self.config.base_url, query).await?;
        Ok(SourceData::Amenities(normalize(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::SourceErrorKind;
    use crate::domain::foundation::AreaCode;

    #[test]
    fn separates_nightlife_from_other_venues() {
        let raw: OverpassResponse = serde_json::from_str(
            r#"{"elements": [
                {"tags": {"amenity": "pub"}},
                {"tags": {"amenity": "bar"}},
                {"tags": {"amenity": "nightclub"}},
                {"tags": {"amenity": "cafe"}},
                {"tags": {"shop": "supermarket"}},
                {"tags": {"leisure": "park"}}
            ]}"#,
        )
        .unwrap();

        let snapshot = normalize(raw);

        assert_eq!(snapshot.amenity_count, 6);
        assert_eq!(snapshot.nightlife_count, 3);
        assert_eq!(snapshot.density_score, 30.0);
    }

    #[tokio::test]
    async fn unknown_area_is_not_found_without_a_request() {
        let source = AmenitiesSource::new(HttpSourceConfig::new("http://127.0.0.1:9"));
        let request = SourceRequest::new(AreaCode::new("ZZ9").unwrap());

        let err = source.fetch(&request).await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert!(err.message.contains("ZZ9"));
    }
}
