//! Employee reputation averaged onto the legal identity

use std::sync::Weak;

use domain::{Company, CompanyId, Notice, Polarity, ReputationSource, aggregate_reputation};
use tracing::{debug, info, instrument, warn};

use super::CompanyService;
use crate::{
    error::ApplicationError,
    ports::{TaskKey, TaskKind},
};

impl CompanyService {
    /// Withdraw the averaged reputation and schedule its recomputation
    ///
    /// The recomputation waits for the settle delay so the reputation
    /// system can recache after the withdrawal.
    #[instrument(skip(self))]
    pub(super) async fn refresh_reputation(&self, company: CompanyId) -> Result<(), ApplicationError> {
        if !self.policy.reputation_averages_enabled {
            return Ok(());
        }
        let c = self.company(company).await?;
        self.clean_self_reputation(&c).await?;

        let legal = c.legal_identity();
        let previous_net = self.ports.reputation.sample(legal).await?.total;
        for (source, value) in self.ports.reputation.contributions(legal).await? {
            if source == c.accumulator(Polarity::Positive)
                || source == c.accumulator(Polarity::Negative)
            {
                self.ports.reputation.adjust(legal, source, -value).await?;
            }
        }

        let service: Weak<Self> = self.this.clone();
        self.ports.deferred.schedule(
            TaskKey::new(company, TaskKind::ReputationRefresh),
            self.policy.settle_delay,
            Box::pin(async move {
                let Some(service) = service.upgrade() else {
                    return;
                };
                if let Err(e) = service.run_reputation_refresh(company, previous_net).await {
                    warn!(company = %company, error = %e, "Reputation refresh failed");
                }
            }),
        );
        debug!(company = %company, "Reputation refresh scheduled");
        Ok(())
    }

    /// Remove every reputation employees gave each other
    #[allow(clippy::float_cmp)]
    async fn clean_self_reputation(&self, company: &Company) -> Result<(), ApplicationError> {
        if !self.policy.deny_company_members_reputation_enabled {
            return Ok(());
        }
        let employees = company.all_employees();
        for &giver in &employees {
            for &receiver in employees.iter().filter(|&&m| m != giver) {
                let given = self.ports.reputation.given_total(giver, receiver).await?;
                if given == 0.0 {
                    continue;
                }
                self.ports
                    .reputation
                    .adjust(receiver, ReputationSource::Member(giver), -given)
                    .await?;
                if self.ports.reputation.given_today(giver, receiver).await? != 0.0 {
                    self.ports.reputation.replenish(giver).await?;
                }
                debug!(company = %company.id, giver = %giver, receiver = %receiver, given, "Removed reputation between employees");
            }
        }
        Ok(())
    }

    /// Apply the employee average to the accumulators
    #[instrument(skip(self))]
    pub(super) async fn run_reputation_refresh(
        &self,
        company: CompanyId,
        previous_net: f64,
    ) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let Some(c) = self.ports.registry.get(company).await? else {
                    debug!(company = %company, "Company gone before reputation refresh");
                    return Ok(());
                };
                let mut samples = Vec::with_capacity(c.employee_count());
                for employee in c.all_employees() {
                    samples.push(self.ports.reputation.sample(employee).await?);
                }
                let averaged =
                    aggregate_reputation(&samples, self.policy.reputation_averages_bonus_enabled);

                let legal = c.legal_identity();
                self.ports
                    .reputation
                    .adjust(legal, c.accumulator(Polarity::Negative), averaged.negative)
                    .await?;
                self.ports
                    .reputation
                    .adjust(legal, c.accumulator(Polarity::Positive), averaged.positive)
                    .await?;

                let net = self.ports.reputation.sample(legal).await?.total;
                if (net - previous_net).abs() > f64::EPSILON {
                    info!(company = %company, net, "Company reputation changed");
                    self.messenger
                        .company(
                            &c,
                            Notice::reputation(format!("Reputation for {} changed to {net}.", c.name)),
                        )
                        .await;
                }
                Ok(())
            })
            .await
    }
}
