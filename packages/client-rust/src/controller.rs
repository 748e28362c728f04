//! Request lifecycle controller for the catalog list.
//!
//! Turns a stream of [`QueryDescriptor`] changes into one authoritative
//! [`CatalogSnapshot`]. Every [`submit`](CatalogController::submit) starts a
//! new epoch and cancels the previous request; an outcome is applied only if
//! its epoch is still the latest when it arrives, whatever order the network
//! delivers responses in.

use std::sync::Arc;

use listings_core::{QueryDescriptor, QueryResult};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::fetch::{CatalogFetcher, LOAD_FAILED_MESSAGE};
use crate::lifecycle::RequestLifecycle;
use crate::snapshot::{CatalogSnapshot, LoadPhase};

/// Latest-wins controller for paged catalog queries.
///
/// Fetches run on the ambient Tokio runtime; `submit`, `retry` and
/// `go_to_page` must be called from within one.
pub struct CatalogController<F> {
    fetcher: Arc<F>,
    lifecycle: Arc<RequestLifecycle<CatalogSnapshot>>,
    last_query: Mutex<Option<QueryDescriptor>>,
}

impl<F: CatalogFetcher> CatalogController<F> {
    #[must_use]
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            lifecycle: Arc::new(RequestLifecycle::new(CatalogSnapshot::default())),
            last_query: Mutex::new(None),
        }
    }

    /// Starts loading `query`, superseding any request still in flight.
    ///
    /// The snapshot switches to loading before this returns. Ignored after
    /// [`dispose`](Self::dispose).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn submit(&self, query: QueryDescriptor) {
        let Some(ticket) = self.lifecycle.begin(CatalogSnapshot::begin_loading) else {
            warn!("submit on disposed catalog controller ignored");
            return;
        };
        *self.last_query.lock() = Some(query.clone());
        debug!(epoch = ticket.epoch, page = query.page, sort = %query.sort, "catalog request started");

        let fetcher = Arc::clone(&self.fetcher);
        let lifecycle = Arc::clone(&self.lifecycle);
        tokio::spawn(async move {
            let outcome = fetcher.fetch_page(&query, &ticket.cancel).await;
            lifecycle.resolve(ticket.epoch, outcome, apply_page, stop_loading);
        });
    }

    /// Re-issues the last submitted query under a new epoch. Without a prior
    /// query this loads the default one.
    pub fn retry(&self) {
        let query = self.last_query().unwrap_or_default();
        self.submit(query);
    }

    /// Loads page `page` of the last query, clamped into the page range of
    /// the last result shown.
    pub fn go_to_page(&self, page: i64) {
        let target = self.lifecycle.current().pagination.clamp_page(page);
        let query = self.last_query().unwrap_or_default();
        self.submit(query.with_page(i64::try_from(target).unwrap_or(i64::MAX)));
    }

    /// Cancels any outstanding request; later submits are ignored. Safe to
    /// call more than once.
    pub fn dispose(&self) {
        self.lifecycle.dispose(stop_loading);
    }
}

impl<F> CatalogController<F> {
    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.lifecycle.current()
    }

    /// Receiver notified whenever the snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CatalogSnapshot> {
        self.lifecycle.subscribe()
    }

    /// The descriptor of the most recent `submit`.
    #[must_use]
    pub fn last_query(&self) -> Option<QueryDescriptor> {
        self.last_query.lock().clone()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

impl<F> Drop for CatalogController<F> {
    fn drop(&mut self) {
        self.lifecycle.dispose(stop_loading);
    }
}

fn apply_page(
    snapshot: &mut CatalogSnapshot,
    result: Result<QueryResult, crate::fetch::FetchError>,
) {
    match result {
        Ok(page) => snapshot.apply_result(page),
        Err(err) => {
            warn!(error = %err, "catalog request failed");
            snapshot.apply_failure(LOAD_FAILED_MESSAGE);
        }
    }
}

fn stop_loading(snapshot: &mut CatalogSnapshot) -> bool {
    if !snapshot.loading {
        return false;
    }
    snapshot.loading = false;
    if snapshot.phase == LoadPhase::Loading {
        snapshot.phase = LoadPhase::Idle;
    }
    true
}
