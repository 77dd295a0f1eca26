//! Provisioning port - allocation of a company's synthetic records

use async_trait::async_trait;
use domain::{Account, CurrencyId, Member, MemberId};

use crate::error::ApplicationError;

#[async_trait]
pub trait ProvisioningPort: Send + Sync {
    /// Create the member that stands for a company, under a unique name derived from `base_name`
    async fn create_legal_identity(
        &self,
        base_name: &str,
        logout_time: f64,
    ) -> Result<Member, ApplicationError>;

    /// Open `holder`'s personal account under a unique name derived from `base_name`
    async fn open_treasury(
        &self,
        holder: MemberId,
        base_name: &str,
    ) -> Result<Account, ApplicationError>;

    /// Issue `issuer`'s currency under a unique name derived from `base_name`
    async fn issue_currency(
        &self,
        issuer: MemberId,
        base_name: &str,
    ) -> Result<CurrencyId, ApplicationError>;
}
