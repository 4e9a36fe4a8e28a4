//! School ratings source, via Overpass `amenity=school` around the centroid.
//!
//! Inspection grades are read from `ofsted:rating` (or `ofsted_rating`)
//! tags where mappers have recorded them.

use async_trait::async_trait;

use crate::domain::enrichment::{SchoolsSnapshot, SourceData, SourceKind};
use crate::domain::scoring::normalization::{average_school_quality, school_grade_score};
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{centroid_of, HttpSourceConfig};
use super::overpass::{self, OverpassResponse, DEFAULT_RADIUS_M};

const RATING_TAGS: [&str; 3] = ["ofsted:rating", "ofsted_rating", "rating"];

/// Overpass-backed schools client.
pub struct SchoolsSource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl SchoolsSource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self { config, client }
    }
}

fn normalize(raw: OverpassResponse) -> SchoolsSnapshot {
    let ratings: Vec<f64> = raw
        .elements
        .iter()
        .filter_map(|school| {
            RATING_TAGS
                .iter()
                .find_map(|tag| school.tag(tag))
                .and_then(school_grade_score)
        })
        .collect();

    SchoolsSnapshot {
        school_count: raw.elements.len() as u32,
        rated_count: ratings.len() as u32,
        average_quality: average_school_quality(&ratings),
    }
}

#[async_trait]
impl SourceProvider for SchoolsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Schools
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let centroid = centroid_of(request.area_code.as_str())?;
        let query = overpass::around_query(&["[\"amenity\"=\"school\"]"], DEFAULT_RADIUS_M, centroid);
        let raw = overpass::run(&self.client, &self.config.base_url, query).await?;
        Ok(SourceData::Schools(normalize(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::SourceErrorKind;
    use crate::domain::foundation::AreaCode;

    #[test]
    fn averages_only_rated_schools() {
        let raw: OverpassResponse = serde_json::from_str(
            r#"{"elements": [
                {"tags": {"name": "A", "ofsted:rating": "Outstanding"}},
                {"tags": {"name": "B", "ofsted_rating": "good"}},
                {"tags": {"name": "C"}},
                {"tags": {"name": "D", "ofsted:rating": "n/a"}}
            ]}"#,
        )
        .unwrap();

        let snapshot = normalize(raw);

        assert_eq!(snapshot.school_count, 4);
        assert_eq!(snapshot.rated_count, 2);
        assert_eq!(snapshot.average_quality, 85.0);
    }

    #[test]
    fn no_rated_schools_is_neutral() {
        let raw: OverpassResponse = serde_json::from_str(r#"{"elements": [{"tags": {}}]}"#).unwrap();
        let snapshot = normalize(raw);
        assert_eq!(snapshot.rated_count, 0);
        assert_eq!(snapshot.average_quality, 50.0);
    }

    #[tokio::test]
    async fn unknown_area_is_not_found_without_a_request() {
        let source = SchoolsSource::new(HttpSourceConfig::new("http://127.0.0.1:9"));
        let request = SourceRequest::new(AreaCode::new("ZZ9").unwrap());

        let err = source.fetch(&request).await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert!(err.message.contains("ZZ9"));
    }
}
