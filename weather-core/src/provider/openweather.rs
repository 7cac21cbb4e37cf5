use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::model::{Coordinate, CurrentWeather, Forecast, ForecastEntry, WeatherReport};

use super::{ProviderError, WeatherProvider, fetch_json};

const CURRENT: &str = "OpenWeather current";
const FORECAST: &str = "OpenWeather forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key: api_key.into(), base_url, http }
    }

    fn request(&self, endpoint: &str, coordinate: Coordinate) -> reqwest::RequestBuilder {
        self.http.get(format!("{}/{endpoint}", self.base_url)).query(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("appid", self.api_key.clone()),
        ])
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_current(&self, coordinate: Coordinate) -> Result<OwCurrentResponse, ProviderError> {
        fetch_json(self.request("weather", coordinate), CURRENT).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
    ) -> Result<OwForecastResponse, ProviderError> {
        fetch_json(self.request("forecast", coordinate), FORECAST).await
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_max: f64,
    temp_min: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
    #[serde(default)]
    sea_level: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwClouds {
    all: u8,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    main: OwForecastMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    clouds: OwClouds,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn first_description(weather: Vec<OwWeather>, service: &'static str) -> Result<String, ProviderError> {
    weather.into_iter().next().map(|w| w.description).ok_or_else(|| ProviderError::Malformed {
        service,
        reason: "missing weather description".to_string(),
    })
}

impl OwCurrentResponse {
    fn into_current(self, city: &str) -> Result<CurrentWeather, ProviderError> {
        Ok(CurrentWeather {
            city: city.to_string(),
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            pressure: self.main.pressure,
            wind_speed: self.wind.speed,
            cloud_coverage: self.clouds.all,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            condition_description: first_description(self.weather, CURRENT)?,
        })
    }
}

impl OwForecastResponse {
    fn into_forecast(self, city: &str) -> Result<Forecast, ProviderError> {
        let entries = self
            .list
            .into_iter()
            .map(|e| {
                Ok(ForecastEntry {
                    temperature_max: e.main.temp_max,
                    temperature_min: e.main.temp_min,
                    feels_like: e.main.feels_like,
                    humidity: e.main.humidity,
                    pressure: e.main.pressure,
                    cloud_coverage: e.clouds.all,
                    wind_speed: e.wind.speed,
                    sea_level: e.main.sea_level,
                    condition_description: first_description(e.weather, FORECAST)?,
                })
            })
            .collect::<Result<Vec<_>, ProviderError>>()?;

        Ok(Forecast { city: city.to_string(), entries })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_weather(
        &self,
        coordinate: Coordinate,
        city: &str,
    ) -> Result<WeatherReport, ProviderError> {
        debug!(city, %coordinate, "fetching current weather and forecast");

        // Both requests are in flight at once; the first failure fails the pair.
        let (current, forecast) =
            tokio::try_join!(self.fetch_current(coordinate), self.fetch_forecast(coordinate))?;

        Ok(WeatherReport { current: current.into_current(city)?, forecast: forecast.into_forecast(city)? })
    }
}
