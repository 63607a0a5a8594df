//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Provides structured error responses following the Problem Details standard.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use geopath_lib::Error as LibError;

/// Problem type URI for a start or goal node missing from the graph.
pub const PROBLEM_NODE_NOT_FOUND: &str = "/problems/node-not-found";

/// Problem type URI for searches that exhaust the graph without a route.
pub const PROBLEM_PATH_NOT_FOUND: &str = "/problems/path-not-found";

/// Problem type URI for addresses the geocoder cannot resolve.
pub const PROBLEM_ADDRESS_NOT_FOUND: &str = "/problems/address-not-found";

/// Problem type URI for invalid request parameters.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for upstream geocoding failures.
pub const PROBLEM_GEOCODING_FAILED: &str = "/problems/geocoding-failed";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// RFC 9457 Problem Details response structure.
///
/// Carries `success: false` as an extension member so clients can branch on
/// the same field for success and error bodies.
///
/// # Example
///
/// ```
/// use geopath_service_shared::{ProblemDetails, PROBLEM_INVALID_REQUEST};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_REQUEST,
///     "Invalid Request",
///     StatusCode::BAD_REQUEST,
/// )
/// .with_detail("Address is required")
/// .with_request_id("req-12345");
/// assert_eq!(problem.status, 400);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// URI reference identifying the specific occurrence (the request ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Always `false`.
    pub success: bool,
}

impl ProblemDetails {
    /// Create a new ProblemDetails with required fields.
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            success: false,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 Bad Request for invalid input.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 404 Not Found for a start or goal node absent from the graph.
    pub fn node_not_found(id: impl std::fmt::Display, request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_NODE_NOT_FOUND, "Node Not Found", StatusCode::NOT_FOUND)
            .with_detail(format!("Start or goal node not found: {id}"))
            .with_request_id(request_id)
    }

    /// 404 Not Found for an unreachable destination.
    pub fn path_not_found(request_id: impl Into<String>) -> Self {
        Self::new(PROBLEM_PATH_NOT_FOUND, "Path Not Found", StatusCode::NOT_FOUND)
            .with_detail("No path found")
            .with_request_id(request_id)
    }

    /// 404 Not Found for an address without geocoding results.
    pub fn address_not_found(address: &str, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_ADDRESS_NOT_FOUND,
            "Address Not Found",
            StatusCode::NOT_FOUND,
        )
        .with_detail(format!("No results found for address '{address}'"))
        .with_request_id(request_id)
    }

    /// 502 Bad Gateway for geocoding provider failures.
    pub fn geocoding_failed(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_GEOCODING_FAILED,
            "Geocoding Failed",
            StatusCode::BAD_GATEWAY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 500 Internal Server Error.
    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = Json(&self).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        *response.status_mut() = status;
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        LibError::NodeNotFound { id } => ProblemDetails::node_not_found(id, request_id),
        LibError::NoPathFound { .. } => ProblemDetails::path_not_found(request_id),
        LibError::AddressNotFound { address } => {
            ProblemDetails::address_not_found(address, request_id)
        }
        LibError::InvalidCoordinate { .. } | LibError::UnknownAlgorithm { .. } => {
            ProblemDetails::bad_request(error.to_string(), request_id)
        }
        LibError::Geocoding { .. } | LibError::Http(_) => {
            ProblemDetails::geocoding_failed(error.to_string(), request_id)
        }
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
