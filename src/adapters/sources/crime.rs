//! Street-level crime source.
//!
//! `GET {base}/crimes-street/all-crime?lat=&lng=` around the area centroid.
//! The response is one element per recorded crime for the latest month.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::domain::enrichment::{CrimeSnapshot, SourceData, SourceKind};
use crate::domain::scoring::normalization::safety_from_crime_count;
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{centroid_of, map_send_error, read_json, HttpSourceConfig};

/// Police data API client.
pub struct CrimeSource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl CrimeSource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self { config, client }
    }
}

#[derive(Debug, Deserialize)]
struct StreetCrime {
    #[serde(default = "other_category")]
    category: String,
}

fn other_category() -> String {
    "other".to_string()
}

fn normalize(crimes: Vec<StreetCrime>) -> CrimeSnapshot {
    let mut by_category: BTreeMap<String, u32> = BTreeMap::new();
    for crime in &crimes {
        *by_category.entry(crime.category.clone()).or_default() += 1;
    }
    let total = crimes.len() as u32;

    CrimeSnapshot {
        total_crimes: total,
        by_category,
        safety_score: safety_from_crime_count(total),
    }
}

#[async_trait]
impl SourceProvider for CrimeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Crime
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let centroid = centroid_of(request.area_code.as_str())?;
        let url = format!("{}/crimes-street/all-crime", self.config.base_url);

        let response = self
            .client
            .get(url)
            .query(&[("lat", centroid.lat), ("lng", centroid.lon)])
            .send()
            .await
            .map_err(map_send_error)?;

        let crimes: Vec<StreetCrime> = read_json(response).await?;
        Ok(SourceData::Crime(normalize(crimes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrichment::SourceErrorKind;
    use crate::domain::foundation::AreaCode;

    #[test]
    fn counts_by_category_and_buckets_safety() {
        let crimes: Vec<StreetCrime> = serde_json::from_str(
            r#"[
                {"category": "burglary", "location": {}},
                {"category": "burglary"},
                {"category": "violent-crime"},
                {}
            ]"#,
        )
        .unwrap();

        let snapshot = normalize(crimes);

        assert_eq!(snapshot.total_crimes, 4);
        assert_eq!(snapshot.by_category["burglary"], 2);
        assert_eq!(snapshot.by_category["other"], 1);
        assert_eq!(snapshot.safety_score, 90.0);
    }

    #[test]
    fn busy_area_scores_low() {
        let crimes = (0..150)
            .map(|_| StreetCrime {
                category: "anti-social-behaviour".into(),
            })
            .collect();
        assert_eq!(normalize(crimes).safety_score, 30.0);
    }

    #[tokio::test]
    async fn unknown_area_is_not_found_without_a_request() {
        let source = CrimeSource::new(HttpSourceConfig::new("http://127.0.0.1:9"));
        let request = SourceRequest::new(AreaCode::new("ZZ9").unwrap());

        let err = source.fetch(&request).await.unwrap_err();

        assert_eq!(err.kind, SourceErrorKind::NotFound);
        assert!(err.message.contains("ZZ9"));
    }
}
