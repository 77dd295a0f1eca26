//! Scheduler configuration

use serde::{Deserialize, Serialize};

use super::default_true;
use crate::scheduler::schedules;

/// Recurring self-checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerAppConfig {
    /// Run the recurring desync checks
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cron expression of the desync check (6 fields, seconds first)
    #[serde(default = "default_desync_check_cron")]
    pub desync_check_cron: String,

    /// Cron expression of the play time refresh
    #[serde(default = "default_play_time_cron")]
    pub play_time_cron: String,
}

fn default_desync_check_cron() -> String {
    schedules::EVERY_15_MINUTES.to_string()
}

fn default_play_time_cron() -> String {
    schedules::HOURLY.to_string()
}

impl Default for SchedulerAppConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            desync_check_cron: default_desync_check_cron(),
            play_time_cron: default_play_time_cron(),
        }
    }
}
