//! Listings client: latest-wins request lifecycle controllers over a
//! pluggable fetch collaborator, plus an HTTP implementation of it.

mod epoch;
mod lifecycle;

pub mod controller;
pub mod detail;
pub mod fetch;
pub mod http;
pub mod snapshot;

pub use controller::CatalogController;
pub use detail::ItemController;
pub use fetch::{CatalogFetcher, FetchError, FetchOutcome, LOAD_FAILED_MESSAGE};
pub use http::{HttpCatalogFetcher, HttpFetcherConfig};
pub use snapshot::{CatalogSnapshot, ItemLoadError, ItemSnapshot, LoadPhase};
