//! Error responses.
//!
//! # Responsibilities
//! - Map decoding failures to 400, missing recipes to 404, store failures to 500
//! - Render every failure as `{"error": "..."}`
//!
//! # Design Decisions
//! - Backend failure details are logged, never sent to the client

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::metrics;
use crate::store::StoreError;

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failures a handler can report.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or incomplete caller input.
    #[error("{0}")]
    Validation(String),

    /// The referenced recipe or route does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The route exists but not for this method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The store failed to carry out the operation.
    #[error("store operation {operation} failed: {source}")]
    Backend {
        operation: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    /// Classify a store error raised by `operation`.
    pub fn store(operation: &'static str, err: StoreError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound("Recipe not found".to_string())
        } else {
            ApiError::Backend {
                operation,
                source: err,
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Backend { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Backend { operation, source } => {
                tracing::error!(operation = %operation, error = %source, "Store operation failed");
                metrics::record_store_error(*operation);
                "internal server error".to_string()
            }
            other => {
                tracing::debug!(status = %status, error = %other, "Request rejected");
                other.to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Fallback for paths no route matches.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}

/// Fallback for a known path requested with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Give error responses produced by middleware (timeout, body limit) the
/// same `{"error": ...}` body as handler errors.
pub async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let error = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_ascii_lowercase();
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_TYPE);
    parts.headers.remove(header::CONTENT_LENGTH);

    let mut rendered = (status, Json(ErrorBody { error })).into_response();
    for (name, value) in parts.headers.iter() {
        rendered.headers_mut().append(name, value.clone());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ErrorBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_mapping() {
        let err = ApiError::store("find_by_id", StoreError::NotFound("abc".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await.error, "Recipe not found");
    }

    #[tokio::test]
    async fn test_backend_error_hides_detail() {
        let err = ApiError::store("insert", StoreError::Corrupt("disk full of secrets".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(response).await;
        assert_eq!(body.error, "internal server error");
    }

    #[tokio::test]
    async fn test_bare_middleware_error_gets_json_body() {
        let bare = Response::builder()
            .status(StatusCode::REQUEST_TIMEOUT)
            .header("x-extra", "kept")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = json_error_body(bare).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(response.headers()["x-extra"], "kept");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_of(response).await.error, "request timeout");
    }

    #[tokio::test]
    async fn test_json_and_success_responses_untouched() {
        let ok = Response::builder()
            .status(StatusCode::OK)
            .body(axum::body::Body::from("plain"))
            .unwrap();
        let response = json_error_body(ok).await;
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());

        let handled = ApiError::Validation("bad tag".into()).into_response();
        let response = json_error_body(handled).await;
        assert_eq!(body_of(response).await.error, "bad tag");
    }

    #[tokio::test]
    async fn test_validation_error() {
        let response = ApiError::Validation("tag query parameter is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(response).await.error, "tag query parameter is required");
    }
}
