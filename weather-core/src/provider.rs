use crate::{
    Config,
    model::{CitySelection, Coordinate, WeatherReport},
    provider::{geodb::GeoDbClient, openweather::OpenWeatherClient},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};
use thiserror::Error;
use tracing::debug;

pub mod geodb;
pub mod openweather;

/// Remote services the dashboard talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    OpenWeather,
    GeoDb,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "openweather",
            ServiceId::GeoDb => "geodb",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::OpenWeather, ServiceId::GeoDb]
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "https://api.openweathermap.org/data/2.5",
            ServiceId::GeoDb => "https://wft-geo-db.p.rapidapi.com/v1/geo",
        }
    }

    /// Environment variable that overrides the configured API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ServiceId::OpenWeather => "OPENWEATHER_API_KEY",
            ServiceId::GeoDb => "GEODB_API_KEY",
        }
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ServiceId::OpenWeather),
            "geodb" => Ok(ServiceId::GeoDb),
            _ => Err(anyhow::anyhow!(
                "Unknown service '{value}'. Supported services: openweather, geodb."
            )),
        }
    }
}

/// Failure of a single provider call. Every variant is terminal for that
/// attempt; nothing is retried.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Failed to send request to {service}: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status { service: &'static str, status: StatusCode, body: String },

    #[error("Failed to parse {service} JSON: {source}")]
    Parse {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed {service} response: {reason}")]
    Malformed { service: &'static str, reason: String },
}

/// Source of current conditions plus forecast for a coordinate.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch both halves of the report; fails as a unit if either half fails.
    /// `city` labels both halves of the result.
    async fn fetch_weather(
        &self,
        coordinate: Coordinate,
        city: &str,
    ) -> Result<WeatherReport, ProviderError>;
}

/// Turns a free-text prefix into city candidates.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    async fn search(&self, prefix: &str) -> Result<Vec<CitySelection>, ProviderError>;
}

/// Send `request` and decode a successful JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &'static str,
) -> Result<T, ProviderError> {
    let res = request.send().await.map_err(|source| ProviderError::Transport { service, source })?;

    let status = res.status();
    let body = res.text().await.map_err(|source| ProviderError::Transport { service, source })?;
    debug!(service, %status, bytes = body.len(), "received response");

    if !status.is_success() {
        return Err(ProviderError::Status { service, status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(|source| ProviderError::Parse { service, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

fn http_client(config: &Config) -> anyhow::Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

fn api_key(id: ServiceId, config: &Config) -> anyhow::Result<String> {
    config.provider_api_key(id).map(str::to_owned).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for service '{id}'.\n\
                 Hint: run `weather configure {id}` or set {} in the environment.",
            id.env_var()
        )
    })
}

/// Construct the weather provider from config.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let id = ServiceId::OpenWeather;
    let key = api_key(id, config)?;
    Ok(Arc::new(OpenWeatherClient::with_client(http_client(config)?, config.base_url(id), key)))
}

/// Construct the geocoding provider from config.
pub fn geocoding_provider_from_config(
    config: &Config,
) -> anyhow::Result<Arc<dyn GeocodingProvider>> {
    let id = ServiceId::GeoDb;
    let key = api_key(id, config)?;
    Ok(Arc::new(GeoDbClient::with_client(http_client(config)?, config.base_url(id), key)))
}
