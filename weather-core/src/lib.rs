//! Core library for the `weather` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and geocoding provider clients
//! - Shared domain models
//! - The dashboard state controller and debounced city search
//! - Locally persisted favorites
//! - Display rules and text panels
//!
//! It is used by `weather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod controller;
pub mod display;
pub mod favorites;
pub mod model;
pub mod provider;
pub mod search;
pub mod view;

pub use config::{Config, HomeCity, ProviderConfig};
pub use controller::{Dashboard, DashboardState, FETCH_ERROR_MESSAGE};
pub use favorites::{Favorites, FileStore, KeyValueStore, MemoryStore};
pub use model::{CitySelection, Coordinate, CurrentWeather, Forecast, ForecastEntry, WeatherReport};
pub use provider::{
    GeocodingProvider, ProviderError, ServiceId, WeatherProvider, geodb::GeoDbClient,
    openweather::OpenWeatherClient,
};
pub use search::SuggestionBox;
