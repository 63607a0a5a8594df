//! Health check handlers for Kubernetes probes.
//!
//! Provides `/health/live` and `/health/ready` endpoints that return JSON
//! status responses for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Number of base graph nodes (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            nodes_loaded: None,
        }
    }

    pub fn ready(service: &str, version: &str, nodes: usize) -> Self {
        Self {
            nodes_loaded: Some(nodes),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"geopath-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler. Requires a non-empty base graph.
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let nodes = state.graph().base_len();
    if nodes == 0 {
        let status = HealthStatus::not_ready(service, version, "base graph is empty");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    (StatusCode::OK, Json(HealthStatus::ready(service, version, nodes))).into_response()
}
