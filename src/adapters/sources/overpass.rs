//! Overpass (OpenStreetMap) query helpers shared by schools and amenities.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::foundation::Coordinates;
use crate::ports::SourceError;

use super::http::{map_send_error, read_json};

/// Search radius around an area centroid.
pub const DEFAULT_RADIUS_M: u32 = 1_000;

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Element {
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Element {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// `node[...]` and `way[...]` clauses for each filter, tags only.
pub(crate) fn around_query(filters: &[&str], radius_m: u32, at: Coordinates) -> String {
    let mut query = String::from("[out:json][timeout:25];(");
    for filter in filters {
        for element in ["node", "way"] {
            query.push_str(&format!(
                "{}{}(around:{},{},{});",
                element, filter, radius_m, at.lat, at.lon
            ));
        }
    }
    query.push_str(");out tags;");
    query
}

/// Posts a query to the interpreter endpoint.
pub(crate) async fn run(
    client: &reqwest::Client,
    base_url: &str,
    query: String,
) -> Result<OverpassResponse, SourceError> {
    let response = client
        .post(format!("{}/interpreter", base_url))
        .form(&[("data", query)])
        .send()
        .await
        .map_err(map_send_error)?;
    read_json(response).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_covers_nodes_and_ways() {
        let q = around_query(&["[\"amenity\"=\"school\"]"], 1000, Coordinates::new(51.5, -0.1));
        assert!(q.starts_with("[out:json]"));
        assert!(q.contains("node[\"amenity\"=\"school\"](around:1000,51.5,-0.1);"));
        assert!(q.contains("way[\"amenity\"=\"school\"](around:1000,51.5,-0.1);"));
        assert!(q.ends_with("out tags;"));
    }
}
