//! Pipeline composition: wraps the catalog service in every operation layer.

use tower::ServiceBuilder;

use super::load_shed::{LoadShedLayer, LoadShedService};
use super::metrics::{MetricsLayer, MetricsService};
use super::timeout::{TimeoutLayer, TimeoutService};
use crate::service::config::ServerConfig;
use crate::service::domain::CatalogService;

/// The composed pipeline, outermost layer first. Cheap to clone; clones
/// share the load-shedding permits.
pub type OperationPipeline = LoadShedService<TimeoutService<MetricsService<CatalogService>>>;

/// Builds the operation pipeline around `service`.
///
/// Layer order (outermost to innermost):
/// 1. `LoadShedLayer` -- reject when overloaded before doing any work
/// 2. `TimeoutLayer` -- enforce per-operation timeouts
/// 3. `MetricsLayer` -- record timing and outcome closest to the handler
#[must_use]
pub fn build_operation_pipeline(service: CatalogService, config: &ServerConfig) -> OperationPipeline {
    ServiceBuilder::new()
        .layer(LoadShedLayer::new(config.max_concurrent_operations))
        .layer(TimeoutLayer)
        .layer(MetricsLayer)
        .service(service)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
