//! Catalog query endpoints.
//!
//! `GET /products` evaluates a query and returns one page; `GET /products/{id}`
//! returns a single item. Bodies are JSON unless the request's `Accept`
//! header asks for `application/msgpack`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use listings_core::messages::{ListItemsParams, ListItemsResponse, WireFormat};
use serde::Serialize;
use tower::ServiceExt;
use tracing::warn;

use super::{ApiError, AppState};
use crate::service::{Operation, OperationResponse};

/// Lists one page of the catalog.
///
/// Every parameter is optional and malformed values are normalized rather
/// than rejected; even an unparsable query string yields the default page.
pub async fn list_products_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<ListItemsParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let _request = state.drain.track_request();

    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            warn!(%rejection, "unreadable query string; using defaults");
            ListItemsParams::default()
        }
    };
    let op = Operation::ListItems {
        ctx: state.operation_context(),
        query: params.to_descriptor(),
    };

    match state.pipeline.clone().oneshot(op).await? {
        OperationResponse::Page(result) => negotiated(&headers, &ListItemsResponse::from(result)),
        OperationResponse::Item(_) => Err(ApiError::Internal("list returned an item".into())),
    }
}

/// Returns one item, or 404 `{"message":"Not found"}`.
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let _request = state.drain.track_request();

    let op = Operation::GetItem {
        ctx: state.operation_context(),
        id,
    };
    match state.pipeline.clone().oneshot(op).await? {
        OperationResponse::Item(item) => negotiated(&headers, &item),
        OperationResponse::Page(_) => Err(ApiError::Internal("lookup returned a page".into())),
    }
}

/// Encodes `body` in the format the `Accept` header asks for.
fn negotiated<T: Serialize>(headers: &HeaderMap, body: &T) -> Result<Response, ApiError> {
    let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
    let format = WireFormat::from_accept(accept);
    let bytes = format
        .encode(body)
        .map_err(|err| ApiError::Internal(err.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type()),
            (header::VARY, "accept"),
        ],
        bytes,
    )
        .into_response())
}
