//! HTTP mapping of operation failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use listings_core::messages::ErrorBody;
use tracing::error;

use crate::service::OperationError;

/// Message of a 404 body.
pub const NOT_FOUND_MESSAGE: &str = "Not found";

/// Error returned by the catalog handlers. Rendered as a JSON
/// `{"message": ...}` body with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,
    #[error("overloaded")]
    Overloaded,
    #[error("timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Internal causes are logged, never returned.
    fn message(&self) -> &'static str {
        match self {
            ApiError::NotFound => NOT_FOUND_MESSAGE,
            ApiError::Overloaded => "Server overloaded, try again later",
            ApiError::Timeout => "Request timed out",
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl From<OperationError> for ApiError {
    fn from(err: OperationError) -> Self {
        match err {
            OperationError::NotFound { .. } => ApiError::NotFound,
            OperationError::Overloaded => ApiError::Overloaded,
            OperationError::Timeout { .. } => ApiError::Timeout,
            OperationError::Internal(cause) => ApiError::Internal(format!("{cause:#}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(cause) = &self {
            error!(%cause, "catalog request failed");
        }
        (self.status(), Json(ErrorBody::new(self.message()))).into_response()
    }
}
