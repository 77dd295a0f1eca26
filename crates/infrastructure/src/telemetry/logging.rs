//! Tracing subscriber setup
//!
//! Console output, either human readable or JSON, filtered by `RUST_LOG`
//! when set and by the configured filter otherwise.

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the console layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "application=debug,infrastructure=info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in every record
    #[serde(default)]
    pub with_source_location: bool,
}

fn default_log_filter() -> String {
    "domain=info,application=info,infrastructure=info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            format: LogFormat::default(),
            with_source_location: false,
        }
    }
}

/// Handle proving that logging was initialized
///
/// Keep it alive for the lifetime of the process.
#[derive(Debug)]
pub struct TelemetryGuard {
    format: LogFormat,
}

impl TelemetryGuard {
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Install the global tracing subscriber
///
/// Fails instead of panicking when a subscriber is already installed.
///
/// # Example
///
/// ```ignore
/// use infrastructure::telemetry::{TelemetryConfig, init_telemetry};
///
/// let _guard = init_telemetry(&TelemetryConfig::default())?;
/// ```
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(config.with_source_location)
        .with_line_number(config.with_source_location);

    match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init(),
    }
    .map_err(|e| TelemetryError::Init(e.to_string()))?;

    info!(format = ?config.format, "Logging initialized");
    Ok(TelemetryGuard {
        format: config.format,
    })
}

/// Error type for logging initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to install the tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.format, LogFormat::Text);
        assert!(config.log_filter.contains("domain=info"));
        assert!(!config.with_source_location);
    }

    #[test]
    fn format_deserializes_lowercase() {
        let json = r#"{"format": "json"}"#;
        let parsed: TelemetryConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.format, LogFormat::Json);
        assert_eq!(parsed.log_filter, default_log_filter());
    }

    #[test]
    fn second_initialization_is_an_error() {
        let config = TelemetryConfig::default();
        let first = init_telemetry(&config);
        let second = init_telemetry(&config);
        // another test may have installed the subscriber first
        assert!(first.is_err() || second.is_err());
        assert!(matches!(second, Err(TelemetryError::Init(_))));
    }
}
