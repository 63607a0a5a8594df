//! HTTP middleware for geopath microservices.
//!
//! This module provides:
//! - [`RequestId`]: Newtype for correlation ID extraction/generation
//! - [`extract_or_generate_request_id`]: Extract X-Request-ID header or generate UUID v7
//! - [`propagate_request_id`]: axum middleware that guarantees every request
//!   and response carries an `X-Request-ID`
//!
//! # Request ID Propagation
//!
//! The middleware reuses the caller's `X-Request-ID` header when present,
//! otherwise it generates a time-sortable UUID v7 and writes it into the
//! request headers so handlers see the same value. The ID is attached to a
//! tracing span and echoed on the response.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use http::{HeaderMap, HeaderName, HeaderValue};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Newtype wrapper for request correlation IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new UUID v7 request ID.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Extract the request ID from headers or generate a new UUID v7.
///
/// Empty or non-UTF-8 header values are treated as absent.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RequestId::from)
        .unwrap_or_else(RequestId::generate)
}

/// axum middleware assigning and echoing `X-Request-ID`.
///
/// ```ignore
/// let app = Router::new()
///     .route("/api/v1/algorithms", get(algorithms))
///     .layer(axum::middleware::from_fn(propagate_request_id));
/// ```
pub async fn propagate_request_id(mut request: Request, next: Next) -> Response {
    let request_id = extract_or_generate_request_id(request.headers());
    let header = HeaderValue::from_str(request_id.as_str()).ok();
    if let Some(value) = &header {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, value.clone());
    }

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
