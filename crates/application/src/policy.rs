//! Server policy flags that shape the company protocol

use std::time::Duration;

/// Policy knobs read once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyPolicy {
    /// Scale HQ plots with headcount, mirror citizenship onto employees and
    /// refuse joiners that hold a homestead
    pub property_limits_enabled: bool,
    /// Average employee reputation onto the legal identity
    pub reputation_averages_enabled: bool,
    /// Leave the speaks-well-of-others bonus out of the average
    pub reputation_averages_bonus_enabled: bool,
    /// Remove reputation employees give each other
    pub deny_company_members_reputation_enabled: bool,
    /// Hand employee vehicles to the company on every roster change
    pub vehicle_transfers_enabled: bool,
    /// Use the company name rather than the legal identity name for vehicles
    pub vehicle_transfers_use_company_name_enabled: bool,
    /// Base plot allowance of a homestead claim
    pub base_plots_on_homestead: u32,
    /// Wait before averaging reputation, so the reputation system can recache
    pub settle_delay: Duration,
    /// Coalescing window for employee wealth changes
    pub wealth_change_delay: Duration,
    /// Play time credited to a legal identity per world day, in seconds
    pub daily_play_time_secs: f64,
}

impl Default for CompanyPolicy {
    fn default() -> Self {
        Self {
            property_limits_enabled: true,
            reputation_averages_enabled: true,
            reputation_averages_bonus_enabled: false,
            deny_company_members_reputation_enabled: true,
            vehicle_transfers_enabled: false,
            vehicle_transfers_use_company_name_enabled: true,
            base_plots_on_homestead: 10,
            settle_delay: Duration::from_millis(1000),
            wealth_change_delay: Duration::from_millis(5000),
            daily_play_time_secs: 3600.0,
        }
    }
}
