use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A latitude/longitude pair identifying a location for weather lookup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.latitude, self.longitude)
    }
}

/// Parses the composite `"{lat} {lon}"` form used by search suggestions.
impl FromStr for Coordinate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(anyhow!("Expected '<latitude> <longitude>', got '{s}'"));
        };

        let latitude = lat.parse().with_context(|| format!("Invalid latitude '{lat}'"))?;
        let longitude = lon.parse().with_context(|| format!("Invalid longitude '{lon}'"))?;

        Ok(Self { latitude, longitude })
    }
}

/// A city picked from the geocoder's candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitySelection {
    pub label: String,
    pub coordinate: Coordinate,
}

impl CitySelection {
    pub fn new(label: impl Into<String>, coordinate: Coordinate) -> Self {
        Self { label: label.into(), coordinate }
    }
}

impl fmt::Display for CitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Current conditions. Temperatures are in Kelvin, as delivered by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub wind_speed: f64,
    pub cloud_coverage: u8,
    pub sunrise: i64,
    pub sunset: i64,
    pub condition_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
    pub cloud_coverage: u8,
    pub wind_speed: f64,
    pub sea_level: Option<u32>,
    pub condition_description: String,
}

/// Forecast entries in the order the API returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub entries: Vec<ForecastEntry>,
}

/// Result of one combined current + forecast fetch. Both halves always
/// describe the same city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Forecast,
}
