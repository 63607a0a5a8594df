//! Prometheus metrics infrastructure for geopath microservices.
//!
//! This module provides:
//! - [`MetricsConfig`]: Configuration for the metrics system
//! - [`init_metrics`]: Initialize the Prometheus metrics recorder
//! - [`metrics_handler`]: Axum handler for the metrics endpoint
//! - Business metric helpers for path finding and geocoding
//!
//! # Example
//!
//! ```no_run
//! use geopath_service_shared::metrics::{MetricsConfig, init_metrics, metrics_handler};
//! use axum::{Router, routing::get};
//!
//! let config = MetricsConfig::from_env();
//! init_metrics(&config).expect("failed to initialize metrics");
//!
//! let app: Router = Router::new()
//!     .route(&config.path, get(metrics_handler));
//! ```

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use geopath_lib::{Error as LibError, RouteAlgorithm};

static PROMETHEUS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Configuration for the metrics system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Route for the metrics endpoint (e.g., "/metrics").
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Create configuration from environment variables.
    ///
    /// - `METRICS_ENABLED`: "true" or "false" (default: true)
    /// - `METRICS_PATH`: Path for metrics endpoint (default: "/metrics")
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("METRICS_ENABLED").ok().as_deref(),
            std::env::var("METRICS_PATH").ok(),
        )
    }

    fn from_values(enabled: Option<&str>, path: Option<String>) -> Self {
        let enabled = enabled.is_none_or(|v| !v.trim().eq_ignore_ascii_case("false"));
        let path = path
            .filter(|p| p.starts_with('/'))
            .unwrap_or_else(|| "/metrics".to_string());
        Self { enabled, path }
    }
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetricsError {
    #[error("metrics are disabled")]
    Disabled,
    #[error("metrics recorder already initialized")]
    AlreadyInitialized,
    #[error("failed to install metrics recorder: {0}")]
    InstallFailed(String),
}

/// Install the global Prometheus recorder.
///
/// Must be called once at startup before any metric is recorded; later calls
/// fail with [`MetricsError::AlreadyInitialized`].
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        return Err(MetricsError::Disabled);
    }
    if PROMETHEUS_HANDLE.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| MetricsError::InstallFailed(e.to_string()))?;

    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| MetricsError::AlreadyInitialized)
}

/// Returns `None` if [`init_metrics`] has not been called.
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
    PROMETHEUS_HANDLE.get()
}

/// Axum handler returning Prometheus exposition format text.
pub async fn metrics_handler() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# Metrics not initialized\n".to_string())
}

// =============================================================================
// Business Metrics Helpers
// =============================================================================

/// Increment `geopath_paths_found_total{algorithm}`.
pub fn record_path_found(algorithm: RouteAlgorithm) {
    metrics::counter!(
        "geopath_paths_found_total",
        "algorithm" => algorithm.to_string()
    )
    .increment(1);
}

/// Increment `geopath_paths_failed_total{reason}`.
///
/// `reason` is one of the labels produced by [`failure_reason`] or
/// `"validation_error"`.
pub fn record_path_failed(reason: &'static str) {
    metrics::counter!("geopath_paths_failed_total", "reason" => reason).increment(1);
}

/// Record a route length to the `geopath_path_distance_km` histogram.
pub fn record_path_distance(distance_km: f64, algorithm: RouteAlgorithm) {
    metrics::histogram!(
        "geopath_path_distance_km",
        "algorithm" => algorithm.to_string()
    )
    .record(distance_km);
}

/// Increment `geopath_geocode_requests_total{kind,outcome}`.
///
/// `kind` is "forward", "reverse" or "ip"; `outcome` is "ok" or "error".
pub fn record_geocode_request(kind: &'static str, outcome: &'static str) {
    metrics::counter!(
        "geopath_geocode_requests_total",
        "kind" => kind,
        "outcome" => outcome
    )
    .increment(1);
}

/// Low-cardinality label for a failed path request.
pub fn failure_reason(error: &LibError) -> &'static str {
    match error {
        LibError::NodeNotFound { .. } => "node_not_found",
        LibError::NoPathFound { .. } => "no_path",
        LibError::AddressNotFound { .. } => "address_not_found",
        LibError::InvalidCoordinate { .. } | LibError::UnknownAlgorithm { .. } => {
            "validation_error"
        }
        LibError::Geocoding { .. } | LibError::Http(_) => "geocoding_error",
        _ => "internal_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geopath_lib::NodeId;

    #[test]
    fn test_metrics_config_default() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_metrics_config_from_values() {
        let config = MetricsConfig::from_values(None, None);
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");

        let config = MetricsConfig::from_values(Some("FALSE"), Some("/prom".into()));
        assert!(!config.enabled);
        assert_eq!(config.path, "/prom");

        let config = MetricsConfig::from_values(Some("yes"), Some("prom".into()));
        assert!(config.enabled);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_init_metrics_disabled() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(matches!(init_metrics(&config), Err(MetricsError::Disabled)));
    }

    #[tokio::test]
    async fn test_metrics_handler_returns_prometheus_format() {
        let output = metrics_handler().await;
        assert!(
            output.contains('#') || output.is_empty(),
            "Metrics output should be Prometheus format or indicate not initialized"
        );
    }

    #[test]
    fn test_business_metric_helpers() {
        // Without an installed recorder these are no-ops; they must not panic.
        record_path_found(RouteAlgorithm::Dijkstra);
        record_path_failed("no_path");
        record_path_distance(97.0, RouteAlgorithm::AStar);
        record_geocode_request("forward", "ok");
    }

    #[test]
    fn test_failure_reason_labels() {
        assert_eq!(
            failure_reason(&LibError::NoPathFound {
                start: NodeId::Start,
                goal: NodeId::Destination
            }),
            "no_path"
        );
        assert_eq!(
            failure_reason(&LibError::AddressNotFound {
                address: "x".into()
            }),
            "address_not_found"
        );
        assert_eq!(failure_reason(&LibError::EmptyGraph), "internal_error");
    }
}
