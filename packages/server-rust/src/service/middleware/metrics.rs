//! Metrics middleware for operations.
//!
//! Every operation runs inside an `operation` tracing span and is counted
//! through the `metrics` facade:
//!
//! - `listings_operations_total{service, kind, outcome}` (counter)
//! - `listings_operation_duration_ms{service, kind}` (histogram)
//!
//! Without an installed recorder the facade calls are no-ops.

use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use crate::service::operation::{Operation, OperationError, OperationFuture, OperationResponse};

pub const OPERATIONS_TOTAL: &str = "listings_operations_total";
pub const OPERATION_DURATION_MS: &str = "listings_operation_duration_ms";

// ---------------------------------------------------------------------------
// MetricsLayer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService { inner }
    }
}

// ---------------------------------------------------------------------------
// MetricsService
// ---------------------------------------------------------------------------

/// Records duration and outcome of each operation.
#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
}

/// Outcome label for a finished operation.
fn outcome_label(result: &Result<OperationResponse, OperationError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(err) => err.label(),
    }
}

impl<S> Service<Operation> for MetricsService<S>
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
        let service = op.ctx().service_name;
        let call_id = op.ctx().call_id;
        let kind = op.kind();

        let span = info_span!(
            "operation",
            service,
            kind,
            call_id,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );

        let fut = self.inner.call(op);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;
                let elapsed = start.elapsed();
                let outcome = outcome_label(&result);

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = elapsed.as_millis() as u64;
                let span = tracing::Span::current();
                span.record("duration_ms", duration_ms);
                span.record("outcome", outcome);

                ::metrics::counter!(
                    OPERATIONS_TOTAL,
                    "service" => service,
                    "kind" => kind,
                    "outcome" => outcome
                )
                .increment(1);
                ::metrics::histogram!(OPERATION_DURATION_MS, "service" => service, "kind" => kind)
                    .record(elapsed.as_secs_f64() * 1000.0);

                tracing::debug!(duration_ms, outcome, "operation complete");
                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use listings_core::{evaluate, QueryDescriptor};
    use tower::ServiceExt;

    use super::*;
    use crate::service::operation::{service_names, OperationContext};

    /// Completes list operations immediately and rejects lookups.
    struct ImmediateService;

    impl Service<Operation> for ImmediateService {
        type Response = OperationResponse;
        type Error = OperationError;
        type Future = OperationFuture;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, op: Operation) -> Self::Future {
            Box::pin(async move {
                match op {
                    Operation::ListItems { query, .. } => {
                        Ok(OperationResponse::Page(evaluate(&[], &query)))
                    }
                    Operation::GetItem { id, .. } => Err(OperationError::NotFound { id }),
                }
            })
        }
    }

    fn ctx() -> OperationContext {
        OperationContext::new(42, service_names::CATALOG, 5000)
    }

    #[tokio::test]
    async fn passes_through_response() {
        let svc = MetricsLayer.layer(ImmediateService);
        let op = Operation::ListItems {
            ctx: ctx(),
            query: QueryDescriptor::default(),
        };
        let resp = svc.oneshot(op).await.unwrap();
        assert!(matches!(resp, OperationResponse::Page(ref page) if page.total_pages == 1));
    }

    #[tokio::test]
    async fn passes_through_error() {
        let svc = MetricsLayer.layer(ImmediateService);
        let op = Operation::GetItem {
            ctx: ctx(),
            id: "gone".into(),
        };
        let err = svc.oneshot(op).await.unwrap_err();
        assert_eq!(outcome_label(&Err(err)), "not_found");
    }
}
