//! Application configuration
//!
//! Split into focused sub-modules:
//! - `policy`: server policy flags of the company protocol
//! - `scheduler`: recurring self-checks
//!
//! Logging settings live with the telemetry module.

mod policy;
mod scheduler;

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

pub use policy::CompanyPolicyConfig;
pub use scheduler::SchedulerAppConfig;

use crate::telemetry::TelemetryConfig;

/// Shared default for boolean `true` fields across config structs
pub(crate) const fn default_true() -> bool {
    true
}

/// Environment variable prefix, e.g. `COMPANIES__POLICY__VEHICLE_TRANSFERS_ENABLED`
const ENV_PREFIX: &str = "COMPANIES";

/// Application environment (development or production)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(format!(
                "Invalid environment: {s}. Use 'development' or 'production'"
            )),
        }
    }
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub policy: CompanyPolicyConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub scheduler: SchedulerAppConfig,
}

impl AppConfig {
    /// Load from `config.toml` in the working directory (optional) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            config::Config::builder()
                .add_source(config::File::with_name("config").required(false)),
        )
    }

    /// Load from an explicit file, which must exist, and the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::from_builder(
            config::Config::builder().add_source(config::File::from(path).required(true)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Self = builder
            .set_default("environment", "development")?
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.policy.validate()?;
        debug!(environment = %config.environment, "Configuration loaded");
        Ok(config)
    }
}
