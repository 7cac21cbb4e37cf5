//! Debounced city search feeding the suggestion list.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

use crate::{model::CitySelection, provider::GeocodingProvider};

/// Accepts query keystrokes and publishes city candidates once typing pauses.
///
/// Every input gets a token. A request is only issued if its input is still
/// the newest after the quiet interval, and its response is only published
/// if no newer request has started in the meantime.
#[derive(Debug)]
pub struct SuggestionBox {
    provider: Arc<dyn GeocodingProvider>,
    quiet: Duration,
    latest_input: AtomicU64,
    latest_request: AtomicU64,
    suggestions: watch::Sender<Vec<CitySelection>>,
}

impl SuggestionBox {
    pub fn new(provider: Arc<dyn GeocodingProvider>, quiet: Duration) -> Arc<Self> {
        let (suggestions, _) = watch::channel(Vec::new());
        Arc::new(Self {
            provider,
            quiet,
            latest_input: AtomicU64::new(0),
            latest_request: AtomicU64::new(0),
            suggestions,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<CitySelection>> {
        self.suggestions.subscribe()
    }

    pub fn suggestions(&self) -> Vec<CitySelection> {
        self.suggestions.borrow().clone()
    }

    /// Record new query text. The returned handle completes once this input
    /// has either been superseded or fully handled.
    pub fn on_input(self: &Arc<Self>, query: impl Into<String>) -> JoinHandle<()> {
        let token = self.latest_input.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.into();
        let this = Arc::clone(self);

        tokio::spawn(async move {
            tokio::time::sleep(this.quiet).await;
            if this.latest_input.load(Ordering::SeqCst) != token {
                debug!(token, "input superseded before request");
                return;
            }

            this.latest_request.store(token, Ordering::SeqCst);
            let result = this.provider.search(&query).await;

            if this.latest_request.load(Ordering::SeqCst) != token {
                debug!(token, "dropping stale suggestions");
                return;
            }

            let suggestions = result.unwrap_or_else(|err| {
                warn!(query = %query, error = %err, "city search failed");
                Vec::new()
            });
            this.suggestions.send_replace(suggestions);
        })
    }
}
