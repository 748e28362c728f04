//! Single-item controller backing a detail view.

use std::sync::Arc;

use listings_core::Item;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::fetch::{CatalogFetcher, FetchError, LOAD_FAILED_MESSAGE};
use crate::lifecycle::RequestLifecycle;
use crate::snapshot::{ItemLoadError, ItemSnapshot, LoadPhase};

/// Latest-wins loader for one item at a time. Loading a new id supersedes
/// the previous lookup.
pub struct ItemController<F> {
    fetcher: Arc<F>,
    lifecycle: Arc<RequestLifecycle<ItemSnapshot>>,
}

impl<F: CatalogFetcher> ItemController<F> {
    #[must_use]
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            lifecycle: Arc::new(RequestLifecycle::new(ItemSnapshot::default())),
        }
    }

    /// Loads the item with `id`. An empty id fails immediately with
    /// [`ItemLoadError::MissingId`] and issues no fetch.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn load(&self, id: &str) {
        let id = id.trim();
        if id.is_empty() {
            self.lifecycle.supersede(|snapshot| {
                *snapshot = ItemSnapshot {
                    item: None,
                    loading: false,
                    error: Some(ItemLoadError::MissingId),
                    phase: LoadPhase::Failed,
                };
            });
            return;
        }

        let Some(ticket) = self.lifecycle.begin(|snapshot| {
            snapshot.loading = true;
            snapshot.error = None;
            snapshot.phase = LoadPhase::Loading;
        }) else {
            warn!(id, "load on disposed item controller ignored");
            return;
        };
        debug!(epoch = ticket.epoch, id, "item request started");

        let id = id.to_string();
        let fetcher = Arc::clone(&self.fetcher);
        let lifecycle = Arc::clone(&self.lifecycle);
        tokio::spawn(async move {
            let outcome = fetcher.fetch_item(&id, &ticket.cancel).await;
            lifecycle.resolve(ticket.epoch, outcome, apply_item, stop_loading);
        });
    }

    pub fn dispose(&self) {
        self.lifecycle.dispose(stop_loading);
    }
}

impl<F> ItemController<F> {
    #[must_use]
    pub fn snapshot(&self) -> ItemSnapshot {
        self.lifecycle.current()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ItemSnapshot> {
        self.lifecycle.subscribe()
    }
}

impl<F> Drop for ItemController<F> {
    fn drop(&mut self) {
        self.lifecycle.dispose(stop_loading);
    }
}

fn apply_item(snapshot: &mut ItemSnapshot, result: Result<Item, FetchError>) {
    snapshot.loading = false;
    match result {
        Ok(item) => {
            snapshot.item = Some(item);
            snapshot.error = None;
            snapshot.phase = LoadPhase::Ready;
        }
        Err(FetchError::NotFound { id }) => {
            snapshot.item = None;
            snapshot.error = Some(ItemLoadError::NotFound { id });
            snapshot.phase = LoadPhase::Failed;
        }
        Err(err) => {
            warn!(error = %err, "item request failed");
            snapshot.item = None;
            snapshot.error = Some(ItemLoadError::Unavailable(LOAD_FAILED_MESSAGE.to_string()));
            snapshot.phase = LoadPhase::Failed;
        }
    }
}

fn stop_loading(snapshot: &mut ItemSnapshot) -> bool {
    if !snapshot.loading {
        return false;
    }
    snapshot.loading = false;
    if snapshot.phase == LoadPhase::Loading {
        snapshot.phase = LoadPhase::Idle;
    }
    true
}
