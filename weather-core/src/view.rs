//! Text panels derived from dashboard state.

use chrono::{DateTime, Datelike, TimeZone};
use std::fmt::{self, Display, Write as _};

use crate::{
    controller::DashboardState,
    display::{
        FORECAST_DAYS, WeatherIcon, format_clock, format_header_date, forecast_day_labels,
        icon_for, kelvin_to_celsius,
    },
    favorites::Favorites,
    model::{CurrentWeather, Forecast, ForecastEntry},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DetailTile {
    pub label: &'static str,
    pub value: String,
}

impl DetailTile {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPanel {
    pub city: String,
    pub favorite: bool,
    pub date: String,
    pub description: String,
    pub icon: WeatherIcon,
    pub temperature_c: i64,
    pub details: Vec<DetailTile>,
}

impl CurrentPanel {
    /// Sunrise and sunset are shown in `now`'s time zone.
    pub fn new<Tz: TimeZone>(weather: &CurrentWeather, favorite: bool, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: Display,
    {
        let tz = now.timezone();
        let details = vec![
            DetailTile::new("Feels like", format!("{}°C", kelvin_to_celsius(weather.feels_like))),
            DetailTile::new("Humidity", format!("{}%", weather.humidity)),
            DetailTile::new("Pressure", format!("{} hPa", weather.pressure)),
            DetailTile::new("Wind", format!("{} m/s", weather.wind_speed)),
            DetailTile::new("Sunrise", format_clock(weather.sunrise, &tz)),
            DetailTile::new("Sunset", format_clock(weather.sunset, &tz)),
            DetailTile::new("Clouds", format!("{} oktas", weather.cloud_coverage)),
        ];

        Self {
            city: weather.city.clone(),
            favorite,
            date: format_header_date(now),
            description: weather.condition_description.clone(),
            icon: icon_for(&weather.condition_description),
            temperature_c: kelvin_to_celsius(weather.temperature),
            details,
        }
    }
}

impl Display for CurrentPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = if self.favorite { "★" } else { "☆" };
        writeln!(f, "{star} {}    {}", self.city, self.date)?;
        writeln!(f, "{} {}", self.icon, self.description)?;
        writeln!(f, "{}°C", self.temperature_c)?;
        for tile in &self.details {
            writeln!(f, "  {:<11} {}", tile.label, tile.value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub label: &'static str,
    pub icon: WeatherIcon,
    pub description: String,
    pub max_c: i64,
    pub min_c: i64,
    pub details: Vec<DetailTile>,
}

impl ForecastDay {
    fn new(label: &'static str, entry: &ForecastEntry) -> Self {
        let sea_level = entry.sea_level.map_or_else(|| "n/a".to_string(), |s| format!("{s} m"));
        let details = vec![
            DetailTile::new("Pressure", format!("{} hPa", entry.pressure)),
            DetailTile::new("Humidity", format!("{}%", entry.humidity)),
            DetailTile::new("Clouds", format!("{}%", entry.cloud_coverage)),
            DetailTile::new("Wind speed", format!("{} m/s", entry.wind_speed)),
            DetailTile::new("Sea level", sea_level),
            DetailTile::new("Feels like", format!("{}°C", kelvin_to_celsius(entry.feels_like))),
        ];

        Self {
            label,
            icon: icon_for(&entry.condition_description),
            description: entry.condition_description.clone(),
            max_c: kelvin_to_celsius(entry.temperature_max),
            min_c: kelvin_to_celsius(entry.temperature_min),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPanel {
    pub days: Vec<ForecastDay>,
}

impl ForecastPanel {
    /// Labels the first seven entries with weekdays starting at `now`'s day.
    pub fn new<Tz: TimeZone>(forecast: &Forecast, now: &DateTime<Tz>) -> Self {
        let labels = forecast_day_labels(now.weekday());
        let days = labels
            .into_iter()
            .zip(forecast.entries.iter().take(FORECAST_DAYS))
            .map(|(label, entry)| ForecastDay::new(label, entry))
            .collect();

        Self { days }
    }
}

impl Display for ForecastPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weekly Forecast")?;
        for day in &self.days {
            writeln!(
                f,
                "{} {:<10} {:<18} {}°C ↑ | {}°C ↓",
                day.icon, day.label, day.description, day.max_c, day.min_c
            )?;
            let details: Vec<String> =
                day.details.iter().map(|t| format!("{}: {}", t.label, t.value)).collect();
            writeln!(f, "    {}", details.join(", "))?;
        }
        Ok(())
    }
}

/// Full dashboard text: error line, current panel, forecast panel.
pub fn render_dashboard<Tz: TimeZone>(
    state: &DashboardState,
    favorites: &Favorites,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: Display,
{
    let mut out = String::new();

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{error}");
    }

    match &state.current {
        Some(current) => {
            let panel = CurrentPanel::new(current, favorites.contains(&current.city), now);
            let _ = writeln!(out, "{panel}");
        }
        None => {
            let _ = writeln!(out, "Welcome to WeatherSphere. Search for a city to get started.");
        }
    }

    if let Some(forecast) = &state.forecast {
        let _ = write!(out, "{}", ForecastPanel::new(forecast, now));
    }

    out
}
