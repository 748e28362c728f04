//! Operation execution framework.
//!
//! 1. **Operations** (`operation`): typed `ListItems` / `GetItem` requests with context
//! 2. **Middleware** (`middleware`): Tower layers (load shedding, timeout, metrics)
//! 3. **Domain** (`domain`): the catalog service answering operations from a store
//! 4. **Background workers** (`worker`): periodic and on-demand tasks (catalog reload)

pub mod config;
pub mod domain;
pub mod middleware;
pub mod operation;
pub mod worker;

pub use config::ServerConfig;
pub use domain::CatalogService;
pub use middleware::{build_operation_pipeline, OperationPipeline};
pub use operation::{
    service_names, Operation, OperationContext, OperationError, OperationFuture, OperationResponse,
};
pub use worker::{BackgroundRunnable, BackgroundWorker};
