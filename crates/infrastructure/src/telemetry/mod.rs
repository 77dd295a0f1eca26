//! Logging initialization
//!
//! Installs the tracing subscriber used by every crate of the workspace.

mod logging;

pub use logging::{LogFormat, TelemetryConfig, TelemetryError, TelemetryGuard, init_telemetry};
