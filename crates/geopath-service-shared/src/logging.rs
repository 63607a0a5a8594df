//! Structured logging setup for geopath microservices.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT`: `json` (default) or `text` (`pretty` is accepted as an alias)
//! - `RUST_LOG`: Log level filter (default: `info`)
//! - `SERVICE_NAME`: Service name reported at startup
//!
//! # Example
//!
//! ```no_run
//! use geopath_service_shared::logging::{LoggingConfig, init_logging};
//!
//! let config = LoggingConfig::from_env().with_service("route");
//! init_logging(&config).expect("logging already initialized");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines, one event per line.
    #[default]
    Json,
    /// Human-readable multi-line output for development.
    Text,
}

impl LogFormat {
    /// Accepts "json", "text" or "pretty"; anything else falls back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            _ => LogFormat::Json,
        }
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter directive used when `RUST_LOG` is unset or invalid.
    pub level: String,
    pub service: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: "info".to_string(),
            service: None,
        }
    }
}

impl LoggingConfig {
    /// Read `LOG_FORMAT`, `RUST_LOG` and `SERVICE_NAME`.
    pub fn from_env() -> Self {
        let format = std::env::var("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or_default();
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let service = std::env::var("SERVICE_NAME").ok().filter(|s| !s.is_empty());

        Self {
            format,
            level,
            service,
        }
    }

    /// Use `service` unless `SERVICE_NAME` already provided one.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        if self.service.is_none() {
            self.service = Some(service.into());
        }
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.as_deref().unwrap_or(env!("CARGO_PKG_NAME"))
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
///
/// # JSON Format (default)
///
/// ```json
/// {"timestamp":"2026-01-05T10:00:00Z","level":"INFO","fields":{"message":"path found"},"target":"geopath_service_route"}
/// ```
pub fn init_logging(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
    }
}
