//! Request size limits.
//!
//! Requests announcing a larger `content-length` are refused with 413 before
//! the body is read; streamed bodies are cut off at the same limit and fail
//! JSON decoding.

use axum::extract::DefaultBodyLimit;
use tower_http::limit::RequestBodyLimitLayer;

/// Limit enforced by tower-http on the raw body.
pub fn body_limit_layer(max_body_size: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_body_size)
}

/// Limit applied by axum extractors (`Json`, `Bytes`).
pub fn extractor_limit(max_body_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_body_size)
}
