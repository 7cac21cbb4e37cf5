use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::model::{CitySelection, Coordinate};

use super::{GeocodingProvider, ProviderError, fetch_json};

const SERVICE: &str = "GeoDB";

/// Cities below this population are filtered out server-side.
pub const MIN_POPULATION: u32 = 1000;

const DEFAULT_HOST: &str = "wft-geo-db.p.rapidapi.com";

#[derive(Debug, Clone)]
pub struct GeoDbClient {
    api_key: String,
    base_url: String,
    host: String,
    http: Client,
}

impl GeoDbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let host = Url::parse(&base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Self { api_key: api_key.into(), base_url, host, http }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeoCity {
    name: String,
    country_code: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeoCitiesResponse {
    data: Vec<GeoCity>,
}

impl From<GeoCity> for CitySelection {
    fn from(city: GeoCity) -> Self {
        CitySelection::new(
            format!("{}, {}", city.name, city.country_code),
            Coordinate::new(city.latitude, city.longitude),
        )
    }
}

#[async_trait]
impl GeocodingProvider for GeoDbClient {
    async fn search(&self, prefix: &str) -> Result<Vec<CitySelection>, ProviderError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        debug!(prefix, "searching cities");

        let request = self
            .http
            .get(format!("{}/cities", self.base_url))
            .query(&[("minPopulation", MIN_POPULATION.to_string()), ("namePrefix", prefix.to_string())])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host);

        let parsed: GeoCitiesResponse = fetch_json(request, SERVICE).await?;

        Ok(parsed.data.into_iter().map(CitySelection::from).collect())
    }
}
