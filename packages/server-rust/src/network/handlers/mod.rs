//! HTTP handler definitions for the listings server.
//!
//! Defines `AppState` (the shared state carried through axum extractors) and
//! re-exports the handler functions used to build the router.

pub mod catalog;
pub mod error;
pub mod health;

pub use catalog::{get_product_handler, list_products_handler};
pub use error::ApiError;
pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::DrainState;
use crate::service::{service_names, OperationContext, OperationPipeline, ServerConfig};
use crate::traits::CatalogStore;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references and the cloneable operation pipeline, so cloning
/// per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Health and in-flight request tracking.
    pub drain: Arc<DrainState>,
    /// Catalog operations, wrapped in load shedding, timeout and metrics.
    pub pipeline: OperationPipeline,
    /// Direct store access for health reporting.
    pub store: Arc<dyn CatalogStore>,
    /// Operation timeouts and node identity.
    pub server_config: Arc<ServerConfig>,
    /// Source of operation call ids.
    pub call_ids: Arc<AtomicU64>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Context for the next catalog operation.
    #[must_use]
    pub fn operation_context(&self) -> OperationContext {
        OperationContext::new(
            self.call_ids.fetch_add(1, Ordering::Relaxed) + 1,
            service_names::CATALOG,
            self.server_config.default_operation_timeout_ms,
        )
    }
}
