use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::{fmt, sync::Arc};
use weather_core::{
    CitySelection, Config, Dashboard, Favorites, FileStore, GeocodingProvider, ServiceId,
    SuggestionBox, WeatherReport,
    provider::{geocoding_provider_from_config, weather_provider_from_config},
    view::render_dashboard,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "WeatherSphere: current weather and weekly forecast")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to the interactive dashboard.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a service.
    Configure {
        /// Service short name: "openweather" or "geodb".
        service: String,
    },

    /// Show weather for a city once and exit.
    Show {
        /// City name or prefix; the home city when absent.
        query: Option<String>,

        /// Take the first matching city instead of asking.
        #[arg(long)]
        first: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List cities matching a name prefix.
    Search {
        prefix: String,
    },

    /// Toggle a city in the favorites list.
    Favorite {
        /// City label exactly as displayed, e.g. "Srinagar, IN".
        city: String,
    },

    /// List favorite cities.
    Favorites,

    /// Interactive dashboard: search cities and mark favorites.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Dashboard) {
            Command::Configure { service } => configure(&service),
            Command::Show { query, first, json } => show(query, first, json).await,
            Command::Search { prefix } => search(&prefix).await,
            Command::Favorite { city } => toggle_favorite(&city),
            Command::Favorites => list_favorites(),
            Command::Dashboard => dashboard().await,
        }
    }
}

fn configure(service: &str) -> anyhow::Result<()> {
    let id = ServiceId::try_from(service)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    let base_url = Text::new("Base URL (leave empty for the public endpoint):")
        .with_default(&config.base_url(id))
        .prompt()?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    if let Some(provider) = config.providers.get_mut(id.as_str()) {
        let base_url = base_url.trim();
        provider.base_url = (!base_url.is_empty() && base_url != id.default_base_url())
            .then(|| base_url.to_string());
    }
    config.save()?;

    println!("Saved {id} credentials to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(query: Option<String>, first: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let weather = weather_provider_from_config(&config)?;

    let selection = match query {
        None => config.home_city(),
        Some(query) => {
            let geocoder = geocoding_provider_from_config(&config)?;
            pick_city(geocoder.as_ref(), &query, first).await?
        }
    };

    let dashboard = Dashboard::new(weather, config.home_city());
    dashboard.select_city(selection).await;
    let state = dashboard.snapshot();

    if let Some(error) = state.error {
        bail!(error);
    }

    if json {
        let (Some(current), Some(forecast)) = (state.current, state.forecast) else {
            bail!("No weather data available");
        };
        let report = WeatherReport { current, forecast };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let favorites = Favorites::load(FileStore::in_data_dir()?);
        print!("{}", render_dashboard(&state, &favorites, &Local::now()));
    }

    Ok(())
}

async fn pick_city(
    geocoder: &dyn GeocodingProvider,
    query: &str,
    first: bool,
) -> anyhow::Result<CitySelection> {
    let mut candidates = geocoder
        .search(query)
        .await
        .with_context(|| format!("Failed to look up cities matching '{query}'"))?;

    if candidates.is_empty() {
        bail!("No cities match '{query}'");
    }
    if first || candidates.len() == 1 {
        return Ok(candidates.swap_remove(0));
    }

    Ok(Select::new("Which city?", candidates).prompt()?)
}

async fn search(prefix: &str) -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let geocoder = geocoding_provider_from_config(&config)?;

    let candidates = geocoder
        .search(prefix)
        .await
        .with_context(|| format!("Failed to look up cities matching '{prefix}'"))?;

    if candidates.is_empty() {
        println!("No cities match '{prefix}'");
    }
    for city in candidates {
        println!("{:<32} {}", city.label, city.coordinate);
    }
    Ok(())
}

fn toggle_favorite(city: &str) -> anyhow::Result<()> {
    let mut favorites = Favorites::load(FileStore::in_data_dir()?);
    favorites.toggle(city)?;

    if favorites.contains(city) {
        println!("★ {city} added to favorites");
    } else {
        println!("☆ {city} removed from favorites");
    }
    Ok(())
}

fn list_favorites() -> anyhow::Result<()> {
    let favorites = Favorites::load(FileStore::in_data_dir()?);
    if favorites.is_empty() {
        println!("No favorite cities yet.");
    }
    for city in favorites.iter() {
        println!("★ {city}");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Search,
    ToggleFavorite,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Search => "Search for a city",
            Action::ToggleFavorite => "Toggle favorite for this city",
            Action::Quit => "Quit",
        })
    }
}

async fn dashboard() -> anyhow::Result<()> {
    let config = Config::load_with_env()?;
    let dashboard = Dashboard::new(weather_provider_from_config(&config)?, config.home_city());
    let suggestions =
        SuggestionBox::new(geocoding_provider_from_config(&config)?, config.search_debounce());
    let mut favorites = Favorites::load(FileStore::in_data_dir()?);

    print!("{}", render_dashboard(&dashboard.snapshot(), &favorites, &Local::now()));
    dashboard.initialize().await.context("Initial weather load was aborted")?;

    loop {
        print!("{}", render_dashboard(&dashboard.snapshot(), &favorites, &Local::now()));

        let actions = vec![Action::Search, Action::ToggleFavorite, Action::Quit];
        let action = match Select::new("What next?", actions).prompt() {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                Action::Quit
            }
            Err(err) => return Err(err.into()),
        };

        match action {
            Action::Search => search_and_select(&dashboard, &suggestions).await?,
            Action::ToggleFavorite => match dashboard.snapshot().current {
                Some(current) => {
                    if let Err(err) = favorites.toggle(&current.city) {
                        eprintln!("Could not update favorites: {err:#}");
                    }
                }
                None => println!("No city loaded yet."),
            },
            Action::Quit => return Ok(()),
        }
    }
}

async fn search_and_select(
    dashboard: &Dashboard,
    suggestions: &Arc<SuggestionBox>,
) -> anyhow::Result<()> {
    let query = match Text::new("City:").prompt() {
        Ok(query) => query,
        Err(InquireError::OperationCanceled) => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    suggestions.on_input(query).await.context("City search was aborted")?;
    let candidates = suggestions.suggestions();
    if candidates.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }

    match Select::new("Which city?", candidates).prompt() {
        Ok(selection) => dashboard.select_city(selection).await,
        Err(InquireError::OperationCanceled) => {}
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
