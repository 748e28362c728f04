//! Typed operations dispatched through the service pipeline.

use std::future::Future;
use std::pin::Pin;

use listings_core::{Item, QueryDescriptor, QueryResult};

/// Service name constants for routing and metrics labels.
pub mod service_names {
    pub const CATALOG: &str = "catalog";
}

/// Boxed future returned by every service in the operation pipeline.
pub type OperationFuture =
    Pin<Box<dyn Future<Output = Result<OperationResponse, OperationError>> + Send>>;

/// Context carried with every operation through the pipeline.
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub call_id: u64,
    pub service_name: &'static str,
    pub call_timeout_ms: u64,
}

impl OperationContext {
    #[must_use]
    pub fn new(call_id: u64, service_name: &'static str, call_timeout_ms: u64) -> Self {
        Self {
            call_id,
            service_name,
            call_timeout_ms,
        }
    }
}

/// Typed operation variants dispatched through the pipeline.
#[derive(Debug)]
pub enum Operation {
    /// Evaluate a query against the catalog and return one page.
    ListItems {
        ctx: OperationContext,
        query: QueryDescriptor,
    },
    /// Look up one item by id.
    GetItem { ctx: OperationContext, id: String },
}

impl Operation {
    #[must_use]
    pub fn ctx(&self) -> &OperationContext {
        match self {
            Operation::ListItems { ctx, .. } | Operation::GetItem { ctx, .. } => ctx,
        }
    }

    /// Short label used in logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::ListItems { .. } => "list_items",
            Operation::GetItem { .. } => "get_item",
        }
    }
}

/// Successful response from an operation handler.
#[derive(Debug)]
pub enum OperationResponse {
    Page(QueryResult),
    Item(Item),
}

/// Errors returned by operation handlers.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("item {id} not found")]
    NotFound { id: String },
    #[error("operation timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("server overloaded, try again later")]
    Overloaded,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl OperationError {
    /// Metrics label for the error class.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            OperationError::NotFound { .. } => "not_found",
            OperationError::Timeout { .. } => "timeout",
            OperationError::Overloaded => "overloaded",
            OperationError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctx_and_kind_cover_every_variant() {
        let list = Operation::ListItems {
            ctx: OperationContext::new(1, service_names::CATALOG, 100),
            query: QueryDescriptor::default(),
        };
        let get = Operation::GetItem {
            ctx: OperationContext::new(2, service_names::CATALOG, 100),
            id: "a".into(),
        };
        assert_eq!((list.ctx().call_id, list.kind()), (1, "list_items"));
        assert_eq!((get.ctx().call_id, get.kind()), (2, "get_item"));
    }

    #[test]
    fn error_labels() {
        assert_eq!(OperationError::Overloaded.label(), "overloaded");
        assert_eq!(
            OperationError::NotFound { id: "x".into() }.to_string(),
            "item x not found"
        );
    }
}
