//! Dashboard flows end to end: controller, OpenWeather client and rendering.

use chrono::{TimeZone, Utc};
use std::{sync::Arc, time::Duration};
use weather_core::{
    CitySelection, Config, Coordinate, Dashboard, FETCH_ERROR_MESSAGE, Favorites, FileStore,
    GeoDbClient, OpenWeatherClient, SuggestionBox,
    display::kelvin_to_celsius,
    view::render_dashboard,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const CURRENT: &str = include_str!("fixtures/current.json");
const FORECAST: &str = include_str!("fixtures/forecast.json");
const CITIES: &str = include_str!("fixtures/cities.json");

async fn mount_city(server: &MockServer, lat: &str, forecast: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", lat))
        .respond_with(ResponseTemplate::new(200).set_body_string(CURRENT))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", lat))
        .respond_with(forecast)
        .mount(server)
        .await;
}

fn fixture_temp() -> f64 {
    let json: serde_json::Value = serde_json::from_str(CURRENT).expect("fixture parses");
    json["main"]["temp"].as_f64().expect("temp present")
}

#[tokio::test]
async fn initial_load_shows_srinagar() {
    let server = MockServer::start().await;
    for endpoint in ["/weather", "/forecast"] {
        let body = if endpoint == "/weather" { CURRENT } else { FORECAST };
        Mock::given(method("GET"))
            .and(path(endpoint))
            .and(query_param("lat", "34.083656"))
            .and(query_param("lon", "74.797371"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let provider = Arc::new(OpenWeatherClient::new(server.uri(), "KEY"));
    let dashboard = Dashboard::new(provider, Config::default().home_city());
    dashboard.initialize().await.expect("initial load completes");

    let state = dashboard.snapshot();
    let current = state.current.as_ref().expect("weather loaded");
    assert_eq!(current.city, "Srinagar");
    assert_eq!(state.forecast.as_ref().map(|f| f.city.as_str()), Some("Srinagar"));

    let dir = tempfile::tempdir().expect("temp dir");
    let favorites = Favorites::load(FileStore::new(dir.path()));
    let now = Utc.with_ymd_and_hms(2024, 1, 17, 9, 0, 0).single().expect("valid date");
    let text = render_dashboard(&state, &favorites, &now);

    let expected = kelvin_to_celsius(fixture_temp());
    assert_eq!(expected, 16);
    assert!(text.contains(&format!("\n{expected}°C\n")), "rendered:\n{text}");
    assert!(text.contains("☆ Srinagar"));
    assert!(text.contains("Weekly Forecast"));
    assert!(text.contains("Wednesday"));
}

#[tokio::test]
async fn failed_search_keeps_previous_city() {
    let server = MockServer::start().await;
    mount_city(&server, "34.083656", ResponseTemplate::new(200).set_body_string(FORECAST)).await;
    mount_city(&server, "59.91", ResponseTemplate::new(503)).await;

    let provider = Arc::new(OpenWeatherClient::new(server.uri(), "KEY"));
    let dashboard = Dashboard::new(provider, Config::default().home_city());
    dashboard.initialize().await.expect("initial load completes");
    let before = dashboard.snapshot();

    dashboard.select_city(CitySelection::new("Oslo, NO", Coordinate::new(59.91, 10.75))).await;
    let after = dashboard.snapshot();

    assert_eq!(after.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
    assert_eq!(after.current, before.current);
    assert_eq!(after.forecast, before.forecast);
    assert_eq!(after.current.map(|c| c.city), Some("Srinagar".to_string()));
}

#[tokio::test]
async fn search_then_select_updates_dashboard() {
    let server = MockServer::start().await;
    mount_city(&server, "34.083611111", ResponseTemplate::new(200).set_body_string(FORECAST)).await;
    Mock::given(method("GET"))
        .and(path("/cities"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CITIES))
        .mount(&server)
        .await;

    let search = SuggestionBox::new(
        Arc::new(GeoDbClient::new(server.uri(), "GEO_KEY")),
        Duration::from_millis(10),
    );
    search.on_input("Sri").await.expect("search completes");
    let picked = search.suggestions().into_iter().next().expect("a suggestion");
    assert_eq!(picked.label, "Srinagar, IN");

    let dashboard = Dashboard::new(
        Arc::new(OpenWeatherClient::new(server.uri(), "KEY")),
        Config::default().home_city(),
    );
    let mut updates = dashboard.subscribe();
    dashboard.select_city(picked).await;

    assert!(updates.has_changed().expect("dashboard alive"));
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.current.map(|c| c.city), Some("Srinagar, IN".to_string()));
    assert_eq!(state.forecast.map(|f| f.city), Some("Srinagar, IN".to_string()));
    assert_eq!(state.error, None);
}
