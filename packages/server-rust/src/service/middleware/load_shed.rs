//! Load shedding for catalog operations.
//!
//! Every operation needs a slot from a shared [`OperationBudget`]. When all
//! `max_concurrent_operations` slots are taken the operation fails at once
//! with `OperationError::Overloaded` (HTTP 503); nothing is queued.

use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::Semaphore;
use tower::{Layer, Service};
use tracing::warn;

use crate::service::operation::{Operation, OperationError, OperationFuture, OperationResponse};

/// Counter of operations rejected for lack of a slot, labelled by kind.
pub const OPERATIONS_SHED_TOTAL: &str = "listings_operations_shed_total";

/// Concurrency budget shared by every clone of the pipeline.
#[derive(Debug)]
pub struct OperationBudget {
    slots: Arc<Semaphore>,
    limit: u32,
}

impl OperationBudget {
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(limit as usize)),
            limit,
        }
    }

    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Slots currently held by running operations.
    #[must_use]
    pub fn in_use(&self) -> u32 {
        let free = u32::try_from(self.slots.available_permits()).unwrap_or(u32::MAX);
        self.limit.saturating_sub(free)
    }
}

/// Wraps a service so each call first takes a slot from `budget`.
#[derive(Debug, Clone)]
pub struct LoadShedLayer {
    budget: Arc<OperationBudget>,
}

impl LoadShedLayer {
    #[must_use]
    pub fn new(max_concurrent: u32) -> Self {
        Self {
            budget: Arc::new(OperationBudget::new(max_concurrent)),
        }
    }
}

impl<S> Layer<S> for LoadShedLayer {
    type Service = LoadShedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoadShedService {
            inner,
            budget: Arc::clone(&self.budget),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadShedService<S> {
    inner: S,
    budget: Arc<OperationBudget>,
}

impl<S> LoadShedService<S> {
    /// The budget this service draws from.
    #[must_use]
    pub fn budget(&self) -> &OperationBudget {
        &self.budget
    }
}

impl<S> Service<Operation> for LoadShedService<S>
where
    S: Service<Operation, Response = OperationResponse, Error = OperationError> + Send,
    S::Future: Send + 'static,
{
    type Response = OperationResponse;
    type Error = OperationError;
    type Future = OperationFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, op: Operation) -> Self::Future {
        let kind = op.kind();
        match Arc::clone(&self.budget.slots).try_acquire_owned() {
            Ok(slot) => {
                let response = self.inner.call(op);
                Box::pin(async move {
                    let _slot = slot;
                    response.await
                })
            }
            Err(_) => {
                warn!(
                    call_id = op.ctx().call_id,
                    kind,
                    limit = self.budget.limit,
                    "operation shed"
                );
                ::metrics::counter!(OPERATIONS_SHED_TOTAL, "kind" => kind).increment(1);
                Box::pin(async { Err(OperationError::Overloaded) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use listings_core::{evaluate, QueryDescriptor};
    use tokio::sync::{oneshot, Mutex};
    use tower::ServiceExt;

    use super::*;
    use crate::service::operation::{service_names, OperationContext};

    /// Answers with an empty page. The first call waits for `gate` if one
    /// is set; later calls answer at once.
    #[derive(Clone, Default)]
    struct GatedCatalog {
        gate: Arc<Mutex<Option<oneshot::Receiver<()>>>>,
    }

    impl GatedCatalog {
        async fn gated() -> (Self, oneshot::Sender<()>) {
            let (release, rx) = oneshot::channel();
            let catalog = Self::default();
            *catalog.gate.lock().await = Some(rx);
            (catalog, release)
        }
    }

    impl Service<Operation> for GatedCatalog {
        type Response = OperationResponse;
        type Error = OperationError;
        type Future = OperationFuture;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, _op: Operation) -> Self::Future {
            let gate = Arc::clone(&self.gate);
            Box::pin(async move {
                let rx = gate.lock().await.take();
                if let Some(rx) = rx {
                    let _ = rx.await;
                }
                Ok(OperationResponse::Page(evaluate(&[], &QueryDescriptor::default())))
            })
        }
    }

    fn list_op(call_id: u64) -> Operation {
        Operation::ListItems {
            ctx: OperationContext::new(call_id, service_names::CATALOG, 5000),
            query: QueryDescriptor::default(),
        }
    }

    #[tokio::test]
    async fn admits_operations_under_the_limit() {
        let svc = LoadShedLayer::new(4).layer(GatedCatalog::default());
        let resp = svc.clone().oneshot(list_op(1)).await.unwrap();

        assert!(matches!(resp, OperationResponse::Page(ref page) if page.total_items == 0));
        assert_eq!(svc.budget().in_use(), 0);
        assert_eq!(svc.budget().limit(), 4);
    }

    #[tokio::test]
    async fn sheds_while_every_slot_is_held() {
        let (catalog, release) = GatedCatalog::gated().await;
        let mut svc = LoadShedLayer::new(1).layer(catalog);

        // The slot is taken inside `call`, before the future is polled.
        let held = svc.call(list_op(1));
        assert_eq!(svc.budget().in_use(), 1);

        let err = svc.call(list_op(2)).await.unwrap_err();
        assert!(matches!(err, OperationError::Overloaded));

        release.send(()).unwrap();
        assert!(held.await.is_ok());
        assert_eq!(svc.budget().in_use(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slot_is_returned_when_the_caller_gives_up() {
        let (catalog, _release) = GatedCatalog::gated().await;
        let mut svc = LoadShedLayer::new(1).layer(catalog);

        let held = svc.call(list_op(1));
        assert!(tokio::time::timeout(Duration::from_millis(10), held).await.is_err());

        assert_eq!(svc.budget().in_use(), 0);
        assert!(svc.call(list_op(2)).await.is_ok());
    }

    #[tokio::test]
    async fn zero_budget_sheds_everything() {
        let mut svc = LoadShedLayer::new(0).layer(GatedCatalog::default());
        assert_eq!(svc.budget().in_use(), 0);

        let err = svc.call(list_op(1)).await.unwrap_err();
        assert!(matches!(err, OperationError::Overloaded));
    }
}
