//! Shared infrastructure for geopath HTTP microservices.
//!
//! This crate provides common functionality used by the service binaries:
//!
//! - [`AppState`]: Base road graph plus geocoding providers
//! - [`health_live`] and [`health_ready`]: Liveness/readiness probe handlers
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ServiceResponse`]: `{success, data}` envelope for successful responses
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request ID propagation
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! The services follow a thin-handler pattern where all path finding and
//! geocoding logic resides in `geopath-lib`. This crate provides only HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Call geopath-lib APIs                                    │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides static geocoders and a ready-made state
//! for handler tests. Enable the `test-utils` feature to use it from
//! dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    failure_reason, init_metrics, metrics_handler, record_geocode_request, record_path_distance,
    record_path_failed, record_path_found, MetricsConfig, MetricsError,
};
pub use middleware::{
    extract_or_generate_request_id, propagate_request_id, RequestId, REQUEST_ID_HEADER,
};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_ADDRESS_NOT_FOUND, PROBLEM_GEOCODING_FAILED,
    PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST, PROBLEM_NODE_NOT_FOUND,
    PROBLEM_PATH_NOT_FOUND,
};
pub use request::{FindPathRequest, GeocodeRequest, ReverseGeocodeRequest, Validate};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
