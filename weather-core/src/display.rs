//! Display rules shared by every panel: units, icons, day labels, clock format.

use chrono::{DateTime, TimeZone, Timelike, Weekday};
use std::fmt;

const WEEK_DAYS: [&str; 7] =
    ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];

/// Number of forecast entries shown, one per labelled day.
pub const FORECAST_DAYS: usize = WEEK_DAYS.len();

/// Kelvin to whole degrees Celsius. Halves round up, matching `Math.round`.
pub fn kelvin_to_celsius(kelvin: f64) -> i64 {
    (kelvin - 273.15 + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Sunny,
    Cloudy,
    Shower,
    Stormy,
    Snow,
}

impl WeatherIcon {
    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "☀",
            WeatherIcon::Cloudy => "☁",
            WeatherIcon::Shower => "🌧",
            WeatherIcon::Stormy => "⛈",
            WeatherIcon::Snow => "❄",
        }
    }
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Icon for an API condition description. Case-sensitive; unknown phrases
/// fall back to [`WeatherIcon::Sunny`].
pub fn icon_for(description: &str) -> WeatherIcon {
    match description {
        "clear sky" => WeatherIcon::Sunny,
        "few clouds" | "scattered clouds" | "broken clouds" | "overcast clouds" => {
            WeatherIcon::Cloudy
        }
        "shower rain" | "rain" | "light rain" | "moderate rain" | "heavy rain" => {
            WeatherIcon::Shower
        }
        "thunderstorm" => WeatherIcon::Stormy,
        "snow" => WeatherIcon::Snow,
        _ => WeatherIcon::Sunny,
    }
}

/// Weekday names rotated so index 0 is `today`.
///
/// Forecast entries get these labels by position, not by their timestamps.
pub fn forecast_day_labels(today: Weekday) -> [&'static str; 7] {
    let mut days = WEEK_DAYS;
    days.rotate_left(today.num_days_from_sunday() as usize);
    days
}

/// Unix seconds as `h:mm am|pm` in `tz`; hour 0 shows as 12.
pub fn format_clock<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String {
    let Some(utc) = DateTime::from_timestamp(timestamp, 0) else {
        return "--:--".to_string();
    };
    let local = utc.with_timezone(tz);

    let suffix = if local.hour() >= 12 { "pm" } else { "am" };
    let hour = match local.hour() % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{:02} {suffix}", local.minute())
}

/// Weekday and time shown next to the city name, e.g. `Wednesday 02:05 PM`.
pub fn format_header_date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    now.format("%A %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn kelvin_conversion_rounds() {
        assert_eq!(kelvin_to_celsius(300.0), 27);
        assert_eq!(kelvin_to_celsius(273.15), 0);
        assert_eq!(kelvin_to_celsius(0.0), -273);
        assert_eq!(kelvin_to_celsius(260.0), -13);
    }

    #[test]
    fn kelvin_conversion_matches_definition_over_range() {
        let mut k = 200.0;
        while k < 330.0 {
            let expected = (k - 273.15 + 0.5_f64).floor() as i64;
            assert_eq!(kelvin_to_celsius(k), expected, "kelvin {k}");
            k += 0.37;
        }
    }

    #[test]
    fn known_conditions_map_to_icons() {
        assert_eq!(icon_for("clear sky"), WeatherIcon::Sunny);
        assert_eq!(icon_for("broken clouds"), WeatherIcon::Cloudy);
        assert_eq!(icon_for("light rain"), WeatherIcon::Shower);
        assert_eq!(icon_for("thunderstorm"), WeatherIcon::Stormy);
        assert_eq!(icon_for("snow"), WeatherIcon::Snow);
    }

    #[test]
    fn unknown_conditions_fall_back_to_sunny() {
        assert_eq!(icon_for("unrecognized-xyz"), WeatherIcon::Sunny);
        assert_eq!(icon_for("Clear Sky"), WeatherIcon::Sunny);
        assert_eq!(icon_for("RAIN"), WeatherIcon::Sunny);
    }

    #[test]
    fn day_labels_start_today_and_wrap() {
        let labels = forecast_day_labels(Weekday::Wed);
        assert_eq!(
            labels,
            ["Wednesday", "Thursday", "Friday", "Saturday", "Sunday", "Monday", "Tuesday"]
        );
        assert_eq!(forecast_day_labels(Weekday::Sun)[0], "Sunday");
        assert_eq!(forecast_day_labels(Weekday::Sat)[1], "Sunday");
    }

    #[test]
    fn clock_uses_twelve_hour_format() {
        // 1970-01-01 00:05 UTC
        assert_eq!(format_clock(300, &Utc), "12:05 am");
        // 1970-01-01 12:00 UTC
        assert_eq!(format_clock(12 * 3600, &Utc), "12:00 pm");
        // 1970-01-01 18:09 UTC
        assert_eq!(format_clock(18 * 3600 + 9 * 60, &Utc), "6:09 pm");
        assert_eq!(format_clock(9 * 3600 + 30 * 60, &Utc), "9:30 am");
    }

    #[test]
    fn header_date_shows_weekday_and_time() {
        let now = Utc.with_ymd_and_hms(2024, 1, 17, 14, 5, 0).single().expect("valid date");
        assert_eq!(format_header_date(&now), "Wednesday 02:05 PM");
    }
}
