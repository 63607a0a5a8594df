//! Response envelope for successful HTTP responses.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Successful response body: `{"success": true, "data": ...}`.
///
/// Pairs with [`crate::ProblemDetails`], which carries `success: false`.
///
/// # Example
///
/// ```
/// use geopath_service_shared::ServiceResponse;
///
/// let response = ServiceResponse::new(vec!["dijkstra", "astar"]);
/// assert!(response.success);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ServiceResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl<T> From<T> for ServiceResponse<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: Serialize> IntoResponse for ServiceResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
