//! Fetch collaborator contract consumed by the controllers.
//!
//! A fetch resolves to exactly one [`FetchOutcome`]. Cancellation is its own
//! outcome tag, never an error value, so controllers can drop aborted
//! requests without inspecting error causes.

use async_trait::async_trait;
use listings_core::{Item, QueryDescriptor, QueryResult};
use tokio_util::sync::CancellationToken;

/// Generic message shown for any list failure. Causes are logged, not shown.
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load products";

/// Terminal result of one fetch.
#[derive(Debug)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure(FetchError),
    /// The request was abandoned because its token was cancelled.
    Aborted,
}

impl<T> FetchOutcome<T> {
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, FetchOutcome::Aborted)
    }
}

/// Why a fetch did not produce a value.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("item {id} not found")]
    NotFound { id: String },
}

/// Capability that performs the actual catalog calls.
///
/// Implementations should stop in-flight I/O once `cancel` fires and resolve
/// to [`FetchOutcome::Aborted`]; controllers also drop late results on their
/// own, so honoring the token is an optimization, not a correctness need.
#[async_trait]
pub trait CatalogFetcher: Send + Sync + 'static {
    /// Fetches one page of results for `query`.
    async fn fetch_page(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> FetchOutcome<QueryResult>;

    /// Looks up a single item by id.
    async fn fetch_item(&self, id: &str, cancel: &CancellationToken) -> FetchOutcome<Item>;
}
