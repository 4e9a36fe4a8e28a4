//! Property intelligence source, the one source every area needs.
//!
//! `GET {base}/area/{code}` with a bearer key.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::enrichment::{PriceTrends, PropertySnapshot, SourceData, SourceKind};
use crate::ports::{SourceError, SourceProvider, SourceRequest};

use super::http::{map_send_error, read_json, HttpSourceConfig};

/// Property intelligence API client.
pub struct PropertySource {
    config: HttpSourceConfig,
    client: reqwest::Client,
}

impl PropertySource {
    pub fn new(config: HttpSourceConfig) -> Self {
        let client = config.client();
        Self { config, client }
    }
}

#[derive(Debug, Deserialize)]
struct AreaResponse {
    affordability: Option<f64>,
    investment_quality: Option<f64>,
    risk: Option<f64>,
    demand: Option<f64>,
    #[serde(rename = "yield")]
    yield_estimate: Option<f64>,
    rent_pm: Option<f64>,
    purchase: Option<f64>,
    #[serde(default)]
    price_trends: RawTrends,
}

#[derive(Debug, Default, Deserialize)]
struct RawTrends {
    #[serde(rename = "1yr", default)]
    one_year: f64,
    #[serde(rename = "3yr", default)]
    three_year: f64,
    #[serde(rename = "5yr", default)]
    five_year: f64,
}

/// Missing scores become 50; zero or missing prices become unknown.
fn normalize(raw: AreaResponse) -> PropertySnapshot {
    let score = |v: Option<f64>| v.unwrap_or(50.0).clamp(0.0, 100.0);
    let price = |v: Option<f64>| v.filter(|p| *p > 0.0);

    PropertySnapshot {
        affordability_score: score(raw.affordability),
        investment_quality: score(raw.investment_quality),
        risk_score: score(raw.risk),
        demand_index: score(raw.demand),
        rent_per_month: price(raw.rent_pm),
        purchase_price: price(raw.purchase),
        yield_estimate: raw.yield_estimate.unwrap_or(0.0),
        price_trends: PriceTrends {
            one_year: raw.price_trends.one_year,
            three_year: raw.price_trends.three_year,
            five_year: raw.price_trends.five_year,
        },
    }
}

#[async_trait]
impl SourceProvider for PropertySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Property
    }

    async fn fetch(&self, request: &SourceRequest) -> Result<SourceData, SourceError> {
        let url = format!("{}/area/{}", self.config.base_url, request.area_code);
        let mut builder = self.client.get(url);
        if let Some(key) = self.config.api_key() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let raw: AreaResponse = read_json(response).await?;
        Ok(SourceData::Property(normalize(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_full_payload() {
        let raw: AreaResponse = serde_json::from_str(
            r#"{
                "affordability": 72, "investment_quality": 81, "risk": 35, "demand": 66,
                "yield": 4.6, "rent_pm": 1650, "purchase": 525000,
                "price_trends": {"1yr": 2.1, "3yr": 8.4, "5yr": 15.0}
            }"#,
        )
        .unwrap();

        let snapshot = normalize(raw);

        assert_eq!(snapshot.affordability_score, 72.0);
        assert_eq!(snapshot.investment_quality, 81.0);
        assert_eq!(snapshot.rent_per_month, Some(1650.0));
        assert_eq!(snapshot.purchase_price, Some(525000.0));
        assert_eq!(snapshot.price_trends.three_year, 8.4);
    }

    #[test]
    fn missing_fields_fall_back_and_zero_prices_are_unknown() {
        let raw: AreaResponse = serde_json::from_str(r#"{"rent_pm": 0, "affordability": 140}"#).unwrap();

        let snapshot = normalize(raw);

        assert_eq!(snapshot.affordability_score, 100.0);
        assert_eq!(snapshot.risk_score, 50.0);
        assert_eq!(snapshot.rent_per_month, None);
        assert_eq!(snapshot.purchase_price, None);
        assert_eq!(snapshot.price_trends.one_year, 0.0);
    }
}
