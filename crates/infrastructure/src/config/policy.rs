//! Company policy configuration

use std::time::Duration;

use application::CompanyPolicy;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::default_true;

/// Server policy flags as they appear in the config file
///
/// Durations are given in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompanyPolicyConfig {
    #[serde(default = "default_true")]
    pub property_limits_enabled: bool,

    #[serde(default = "default_true")]
    pub reputation_averages_enabled: bool,

    #[serde(default)]
    pub reputation_averages_bonus_enabled: bool,

    #[serde(default = "default_true")]
    pub deny_company_members_reputation_enabled: bool,

    #[serde(default)]
    pub vehicle_transfers_enabled: bool,

    #[serde(default = "default_true")]
    pub vehicle_transfers_use_company_name_enabled: bool,

    /// Base plot allowance of a homestead claim (default: 10)
    #[serde(default = "default_base_plots")]
    #[validate(range(min = 1, max = 10_000))]
    pub base_plots_on_homestead: u32,

    /// Delay before employee reputation is averaged (default: 1000ms)
    #[serde(default = "default_settle_delay_ms")]
    #[validate(range(max = 600_000))]
    pub settle_delay_ms: u64,

    /// Coalescing window for employee wealth changes (default: 5000ms)
    #[serde(default = "default_wealth_change_delay_ms")]
    #[validate(range(max = 600_000))]
    pub wealth_change_delay_ms: u64,

    /// Play time credited to a legal identity per world day (default: 3600s)
    #[serde(default = "default_daily_play_time_secs")]
    #[validate(range(min = 0.0, max = 86_400.0))]
    pub daily_play_time_secs: f64,
}

const fn default_base_plots() -> u32 {
    10
}

const fn default_settle_delay_ms() -> u64 {
    1000
}

const fn default_wealth_change_delay_ms() -> u64 {
    5000
}

const fn default_daily_play_time_secs() -> f64 {
    3600.0
}

impl Default for CompanyPolicyConfig {
    fn default() -> Self {
        Self {
            property_limits_enabled: true,
            reputation_averages_enabled: true,
            reputation_averages_bonus_enabled: false,
            deny_company_members_reputation_enabled: true,
            vehicle_transfers_enabled: false,
            vehicle_transfers_use_company_name_enabled: true,
            base_plots_on_homestead: default_base_plots(),
            settle_delay_ms: default_settle_delay_ms(),
            wealth_change_delay_ms: default_wealth_change_delay_ms(),
            daily_play_time_secs: default_daily_play_time_secs(),
        }
    }
}

impl CompanyPolicyConfig {
    /// Convert into the policy the company service runs with
    #[must_use]
    pub const fn to_policy(&self) -> CompanyPolicy {
        CompanyPolicy {
            property_limits_enabled: self.property_limits_enabled,
            reputation_averages_enabled: self.reputation_averages_enabled,
            reputation_averages_bonus_enabled: self.reputation_averages_bonus_enabled,
            deny_company_members_reputation_enabled: self.deny_company_members_reputation_enabled,
            vehicle_transfers_enabled: self.vehicle_transfers_enabled,
            vehicle_transfers_use_company_name_enabled: self
                .vehicle_transfers_use_company_name_enabled,
            base_plots_on_homestead: self.base_plots_on_homestead,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            wealth_change_delay: Duration::from_millis(self.wealth_change_delay_ms),
            daily_play_time_secs: self.daily_play_time_secs,
        }
    }
}
