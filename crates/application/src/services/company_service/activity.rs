//! Online state and play time of the legal identity
//!
//! A legal identity never logs in, so its activity is synthesized from its
//! employees to keep it clear of inactivity rules.

use domain::{ActiveSpan, CompanyId, SECONDS_PER_DAY};
use tracing::{debug, instrument};

use super::CompanyService;
use crate::error::ApplicationError;

impl CompanyService {
    /// Stamp a logout on the legal identity once no employee is online
    #[instrument(skip(self))]
    pub async fn update_online_state(&self, company: CompanyId) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                for employee in c.all_employees() {
                    if self.member(employee).await?.online {
                        return Ok(());
                    }
                }
                let mut legal = self.legal_member(&c).await?;
                legal.logout_time = self.ports.clock.now_seconds();
                self.ports.members.update(&legal).await?;
                debug!(company = %company, logout_time = legal.logout_time, "All employees offline");
                self.update_play_time(company).await
            })
            .await
    }

    /// Credit the daily play time when the last day falls short of it
    pub async fn update_play_time(&self, company: CompanyId) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let mut legal = self.legal_member(&c).await?;
                let now = self.ports.clock.now_seconds();
                let daily = self.policy.daily_play_time_secs;
                if legal.active_seconds_in_last(SECONDS_PER_DAY, now) < daily {
                    legal.active_time.push(ActiveSpan::new(now - daily, now));
                    self.ports.members.update(&legal).await?;
                    debug!(company = %company, "Play time credited");
                }
                Ok(())
            })
            .await
    }

    /// Rebuild the play time log with one span per elapsed world day
    pub async fn init_play_time(&self, company: CompanyId) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let mut legal = self.legal_member(&c).await?;
                let now = self.ports.clock.now_seconds();
                let daily = self.policy.daily_play_time_secs;
                legal.active_time = (1..=self.ports.clock.day())
                    .rev()
                    .map(|day| {
                        let start = now - SECONDS_PER_DAY * f64::from(day);
                        ActiveSpan::new(start, start + daily)
                    })
                    .collect();
                self.ports.members.update(&legal).await
            })
            .await
    }
}
