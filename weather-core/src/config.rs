use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::{
    model::{CitySelection, Coordinate},
    provider::ServiceId,
};

/// Quiet interval before a search suggestion request is issued.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 600;

/// Credentials and endpoint for a single remote service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,

    /// Overrides the service's public endpoint when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// City shown when the dashboard starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeCity {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for HomeCity {
    fn default() -> Self {
        Self { label: "Srinagar".to_string(), latitude: 34.083656, longitude: 74.797371 }
    }
}

impl From<&HomeCity> for CitySelection {
    fn from(home: &HomeCity) -> Self {
        CitySelection::new(home.label.clone(), Coordinate::new(home.latitude, home.longitude))
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    ///
    /// [providers.geodb]
    /// api_key = "..."
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<HomeCity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_debounce_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn provider_config(&self, id: ServiceId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Load config from disk and apply API keys found in the environment.
    pub fn load_with_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding locally persisted state such as favorites.
    pub fn data_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().to_path_buf())
    }

    /// Replace API keys with values from `OPENWEATHER_API_KEY` / `GEODB_API_KEY`
    /// when `lookup` yields a non-empty value.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in ServiceId::all() {
            if let Some(key) = lookup(id.env_var()).filter(|k| !k.trim().is_empty()) {
                self.upsert_provider_api_key(*id, key);
            }
        }
    }

    /// Set or replace a service's API key, keeping any custom base URL.
    pub fn upsert_provider_api_key(&mut self, id: ServiceId, api_key: String) {
        match self.providers.get_mut(id.as_str()) {
            Some(cfg) => cfg.api_key = api_key,
            None => {
                self.providers
                    .insert(id.as_str().to_string(), ProviderConfig { api_key, base_url: None });
            }
        }
    }

    /// Returns API key for a service, if present.
    pub fn provider_api_key(&self, id: ServiceId) -> Option<&str> {
        self.provider_config(id).map(|cfg| cfg.api_key.as_str())
    }

    pub fn is_provider_configured(&self, id: ServiceId) -> bool {
        self.provider_api_key(id).is_some()
    }

    /// Configured endpoint for a service, falling back to its public one.
    pub fn base_url(&self, id: ServiceId) -> String {
        self.provider_config(id)
            .and_then(|cfg| cfg.base_url.clone())
            .unwrap_or_else(|| id.default_base_url().to_string())
    }

    pub fn home_city(&self) -> CitySelection {
        match &self.home {
            Some(home) => home.into(),
            None => (&HomeCity::default()).into(),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weathersphere", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
