//! Locally persisted set of favorite cities.
//!
//! Storage is reached through [`KeyValueStore`] so the set itself does not
//! care whether it lives in a file or in memory.

use anyhow::{Context, Result};
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tracing::{debug, warn};

/// Storage key holding the JSON array of favorite city names.
pub const FAVORITES_KEY: &str = "favorites";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the platform data directory.
    pub fn in_data_dir() -> Result<Self> {
        Ok(Self::new(crate::Config::data_dir()?))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(path = %path.display(), %err, "no stored value");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Process-local store; contents vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries =
            self.entries.lock().map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Favorite city names, written through to storage on every change.
pub struct Favorites {
    cities: BTreeSet<String>,
    store: Box<dyn KeyValueStore>,
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites").field("cities", &self.cities).finish_non_exhaustive()
    }
}

impl Favorites {
    /// Read the stored set. Missing or unreadable data yields an empty set.
    pub fn load(store: impl KeyValueStore + 'static) -> Self {
        let cities = match store.get(FAVORITES_KEY) {
            None => BTreeSet::new(),
            Some(bytes) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(list) => list.into_iter().collect(),
                Err(err) => {
                    warn!(%err, "ignoring corrupt favorites");
                    BTreeSet::new()
                }
            },
        };

        Self { cities, store: Box::new(store) }
    }

    pub fn contains(&self, city: &str) -> bool {
        self.cities.contains(city)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Remove `city` if present, add it otherwise, then persist the whole set.
    /// The in-memory set only changes once the write has succeeded.
    pub fn toggle(&mut self, city: &str) -> Result<&BTreeSet<String>> {
        let mut updated = self.cities.clone();
        if !updated.remove(city) {
            updated.insert(city.to_string());
        }

        let list: Vec<&String> = updated.iter().collect();
        let bytes = serde_json::to_vec(&list).context("Failed to encode favorites")?;
        self.store.set(FAVORITES_KEY, &bytes)?;

        debug!(city, favorite = updated.contains(city), "toggled favorite");
        self.cities = updated;
        Ok(&self.cities)
    }
}
