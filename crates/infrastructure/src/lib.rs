//! Infrastructure layer - Adapters for the company core
//!
//! Implements the ports defined in the application layer over an in-memory
//! world, schedules deferred and periodic work on tokio, and loads the
//! configuration and logging setup.

pub mod adapters;
pub mod bootstrap;
pub mod config;
pub mod scheduled_tasks;
pub mod scheduler;
pub mod telemetry;

pub use adapters::*;
pub use bootstrap::{BootstrapError, CompanyRuntime, world_ports};
pub use config::{AppConfig, CompanyPolicyConfig, ConfigError, Environment, SchedulerAppConfig};
pub use scheduler::{SchedulerConfig, SchedulerError, TaskScheduler, TaskStats};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryGuard, init_telemetry};
