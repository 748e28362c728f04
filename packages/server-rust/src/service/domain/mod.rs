//! Catalog domain service.
//!
//! Implements `tower::Service<Operation>` over a [`CatalogStore`]: list
//! operations run the query evaluator against the current collection
//! snapshot, item operations are point lookups.

use std::sync::Arc;
use std::task::{Context, Poll};

use listings_core::evaluate;
use tower::Service;
use tracing::debug;

use crate::service::operation::{Operation, OperationError, OperationFuture, OperationResponse};
use crate::traits::CatalogStore;

/// Serves catalog operations from a shared store.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }
}

impl Service<Operation> for CatalogService {
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            match op {
                Operation::ListItems { ctx, query } => {
                    let collection = store.list().await?;
                    let result = evaluate(&collection, &query);
                    debug!(
                        call_id = ctx.call_id,
                        total_items = result.total_items,
                        page = result.page,
                        "evaluated catalog query"
                    );
                    Ok(OperationResponse::Page(result))
                }
                Operation::GetItem { id, .. } => match store.get(&id).await? {
                    Some(item) => Ok(OperationResponse::Item(item)),
                    None => Err(OperationError::NotFound { id }),
                },
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
