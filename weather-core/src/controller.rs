//! Application state: which city is on screen and whether the last fetch failed.

use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use crate::{
    model::{CitySelection, CurrentWeather, Forecast},
    provider::WeatherProvider,
};

/// Message shown when the combined weather fetch fails.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching weather data";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub current: Option<CurrentWeather>,
    pub forecast: Option<Forecast>,
    pub error: Option<String>,
}

/// Single source of truth for the displayed city. Views subscribe to state
/// changes through [`Dashboard::subscribe`].
#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    home: CitySelection,
    state: watch::Sender<DashboardState>,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn WeatherProvider>, home: CitySelection) -> Arc<Self> {
        let (state, _) = watch::channel(DashboardState::default());
        Arc::new(Self { provider, home, state })
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Start loading the home city in the background. State stays empty
    /// until the fetch resolves.
    pub fn initialize(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let home = self.home.clone();
        tokio::spawn(async move { this.select_city(home).await })
    }

    /// Fetch weather for `selection` and publish it.
    ///
    /// Overlapping calls are not sequenced: whichever resolves last wins.
    pub async fn select_city(&self, selection: CitySelection) {
        let result = self.provider.fetch_weather(selection.coordinate, &selection.label).await;

        match result {
            Ok(report) => {
                info!(city = %selection.label, "weather updated");
                self.state.send_modify(|state| {
                    state.current = Some(report.current);
                    state.forecast = Some(report.forecast);
                    state.error = None;
                });
            }
            Err(err) => {
                warn!(city = %selection.label, error = %err, "weather fetch failed");
                self.state.send_modify(|state| state.error = Some(FETCH_ERROR_MESSAGE.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Coordinate, ForecastEntry, WeatherReport},
        provider::ProviderError,
    };
    use async_trait::async_trait;
    use std::{sync::Mutex, time::Duration};

    fn report(city: &str, temperature: f64) -> WeatherReport {
        WeatherReport {
            current: CurrentWeather {
                city: city.to_string(),
                temperature,
                feels_like: temperature,
                humidity: 50,
                pressure: 1010,
                wind_speed: 2.0,
                cloud_coverage: 10,
                sunrise: 0,
                sunset: 0,
                condition_description: "clear sky".to_string(),
            },
            forecast: Forecast {
                city: city.to_string(),
                entries: vec![ForecastEntry {
                    temperature_max: temperature,
                    temperature_min: temperature,
                    feels_like: temperature,
                    humidity: 50,
                    pressure: 1010,
                    cloud_coverage: 10,
                    wind_speed: 2.0,
                    sea_level: None,
                    condition_description: "clear sky".to_string(),
                }],
            },
        }
    }

    /// Answers with a canned temperature per label; labels listed in
    /// `failing` fail, and `delays` holds the response back.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        failing: Vec<&'static str>,
        delays: Vec<(&'static str, Duration)>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch_weather(
            &self,
            _coordinate: Coordinate,
            city: &str,
        ) -> Result<WeatherReport, ProviderError> {
            self.calls.lock().expect("lock").push(city.to_string());

            if let Some((_, delay)) = self.delays.iter().find(|(label, _)| *label == city) {
                tokio::time::sleep(*delay).await;
            }

            if self.failing.contains(&city) {
                return Err(ProviderError::Malformed {
                    service: "test",
                    reason: "scripted failure".to_string(),
                });
            }

            Ok(report(city, 300.0))
        }
    }

    fn selection(label: &str) -> CitySelection {
        CitySelection::new(label, Coordinate::new(1.0, 2.0))
    }

    #[tokio::test]
    async fn success_labels_both_halves_with_selection() {
        let dashboard = Dashboard::new(Arc::new(ScriptedProvider::default()), selection("Home"));

        dashboard.select_city(selection("Oslo, NO")).await;

        let state = dashboard.snapshot();
        assert_eq!(state.current.as_ref().map(|c| c.city.as_str()), Some("Oslo, NO"));
        assert_eq!(state.forecast.as_ref().map(|f| f.city.as_str()), Some("Oslo, NO"));
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn failure_keeps_previous_weather() {
        let provider = ScriptedProvider { failing: vec!["Nowhere"], ..Default::default() };
        let dashboard = Dashboard::new(Arc::new(provider), selection("Home"));

        dashboard.select_city(selection("Oslo, NO")).await;
        let before = dashboard.snapshot();

        dashboard.select_city(selection("Nowhere")).await;
        let after = dashboard.snapshot();

        assert_eq!(after.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(after.current, before.current);
        assert_eq!(after.forecast, before.forecast);
    }

    #[tokio::test]
    async fn success_clears_previous_error() {
        let provider = ScriptedProvider { failing: vec!["Nowhere"], ..Default::default() };
        let dashboard = Dashboard::new(Arc::new(provider), selection("Home"));

        dashboard.select_city(selection("Nowhere")).await;
        assert!(dashboard.snapshot().error.is_some());
        assert!(dashboard.snapshot().current.is_none());

        dashboard.select_city(selection("Lima, PE")).await;
        assert_eq!(dashboard.snapshot().error, None);
    }

    #[tokio::test]
    async fn initialize_loads_home_city_in_background() {
        let dashboard = Dashboard::new(Arc::new(ScriptedProvider::default()), selection("Srinagar"));
        let mut updates = dashboard.subscribe();

        assert_eq!(dashboard.snapshot(), DashboardState::default());

        dashboard.initialize().await.expect("task completes");

        assert!(updates.has_changed().expect("sender alive"));
        let state = updates.borrow_and_update().clone();
        assert_eq!(state.current.map(|c| c.city), Some("Srinagar".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_fetches_last_resolved_wins() {
        let provider = ScriptedProvider {
            delays: vec![("Slow", Duration::from_secs(2)), ("Fast", Duration::from_secs(1))],
            ..Default::default()
        };
        let dashboard = Dashboard::new(Arc::new(provider), selection("Home"));

        // "Slow" is requested first but resolves last.
        tokio::join!(dashboard.select_city(selection("Slow")), dashboard.select_city(selection("Fast")));

        let state = dashboard.snapshot();
        assert_eq!(state.current.map(|c| c.city), Some("Slow".to_string()));
        assert_eq!(state.forecast.map(|f| f.city), Some("Slow".to_string()));
    }
}
