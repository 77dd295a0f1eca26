//! Headquarters plot entitlement

use domain::{Company, CompanyId, Property, headquarters_entitlement};
use tracing::{debug, instrument};

use super::CompanyService;
use crate::error::ApplicationError;

impl CompanyService {
    /// Current headquarters of `company`, if it still owns it
    pub(super) async fn headquarters(
        &self,
        company: &Company,
    ) -> Result<Option<Property>, ApplicationError> {
        let legal = self.legal_member(company).await?;
        let Some(hq) = legal.homestead else {
            return Ok(None);
        };
        Ok(self
            .ports
            .properties
            .get(hq)
            .await?
            .filter(|p| p.is_owned_by(legal.id)))
    }

    /// Base plot allowance the headquarters of `company` is entitled to
    pub fn entitlement_for(&self, company: &Company) -> u32 {
        headquarters_entitlement(
            company.employee_count(),
            self.policy.base_plots_on_homestead,
            self.policy.property_limits_enabled,
        )
    }

    /// Push the current entitlement into the headquarters sizing record
    #[instrument(skip(self))]
    pub(super) async fn refresh_headquarters_plots(
        &self,
        company: CompanyId,
    ) -> Result<(), ApplicationError> {
        let c = self.company(company).await?;
        let Some(mut hq) = self.headquarters(&c).await? else {
            return Ok(());
        };
        let entitlement = self.entitlement_for(&c);
        if hq.plots.as_mut().is_some_and(|p| p.apply_override(entitlement)) {
            debug!(company = %company, property = %hq.id, entitlement, "Headquarters resized");
            self.ports.properties.update(&hq).await?;
        }
        Ok(())
    }
}
