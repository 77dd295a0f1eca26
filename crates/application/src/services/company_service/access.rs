//! Access lists derived from the roster
//!
//! Every refresh recomputes the full list from the current roster, so it is
//! safe to run after any change and running it twice changes nothing.

use std::collections::BTreeSet;

use domain::{Account, Company, CompanyId, MemberId, Property, PropertyId, StorageId};
use tracing::{debug, instrument};

use super::CompanyService;
use crate::error::ApplicationError;

impl CompanyService {
    /// Rewrite the access lists of every owned property and account
    #[instrument(skip(self))]
    pub async fn refresh_all_access(&self, company: CompanyId) -> Result<(), ApplicationError> {
        let c = self.company(company).await?;
        let legal = self.legal_member(&c).await?;
        for deed in self.ports.properties.owned_by(legal.id).await? {
            self.write_property_access(&c, legal.homestead, deed).await?;
        }
        for account in self.owned_accounts(&c).await? {
            self.apply_account_access(&c, account).await?;
        }
        Ok(())
    }

    /// Rewrite the access list of one owned property
    pub(super) async fn apply_property_access(
        &self,
        company: &Company,
        deed: Property,
    ) -> Result<(), ApplicationError> {
        let legal = self.legal_member(company).await?;
        self.write_property_access(company, legal.homestead, deed)
            .await
    }

    async fn write_property_access(
        &self,
        company: &Company,
        headquarters: Option<PropertyId>,
        mut deed: Property,
    ) -> Result<(), ApplicationError> {
        let employees: BTreeSet<MemberId> = company.all_employees().into_iter().collect();
        deed.accessors.clone_from(&employees);
        if headquarters == Some(deed.id) {
            deed.resident_invitations = employees
                .into_iter()
                .filter(|m| !deed.residents.contains(m))
                .collect();
            deed.allow_plots_unclaiming = true;
        }
        self.ports.properties.update(&deed).await
    }

    /// Make the legal identity the only manager and every employee a user
    pub(super) async fn apply_account_access(
        &self,
        company: &Company,
        mut account: Account,
    ) -> Result<(), ApplicationError> {
        account.managers = BTreeSet::from([company.legal_identity()]);
        account.users = company.all_employees().into_iter().collect();
        self.ports.accounts.update(&account).await?;
        if account.id != company.treasury() {
            self.invalidate_company(company.id).await;
        }
        Ok(())
    }

    /// Treasury plus every shared account the legal identity manages
    pub(super) async fn owned_accounts(
        &self,
        company: &Company,
    ) -> Result<Vec<Account>, ApplicationError> {
        let mut accounts = Vec::new();
        if let Some(treasury) = self.ports.accounts.get(company.treasury()).await? {
            accounts.push(treasury);
        }
        accounts.extend(
            self.ports
                .accounts
                .managed_by(company.legal_identity())
                .await?
                .into_iter()
                .filter(|a| a.id != company.treasury() && a.is_shared()),
        );
        Ok(accounts)
    }

    /// Grant every employee access to the storages the legal identity can use
    #[instrument(skip(self))]
    pub(super) async fn refresh_storages(&self, company: CompanyId) -> Result<(), ApplicationError> {
        let c = self.company(company).await?;
        for storage in self
            .ports
            .storages
            .accessible_by(c.legal_identity())
            .await?
        {
            self.grant_storage(&c, storage.id).await?;
        }
        Ok(())
    }

    /// The legal identity gained access to `storage`
    #[instrument(skip(self))]
    pub async fn on_legal_identity_gained_storage(
        &self,
        company: CompanyId,
        storage: StorageId,
    ) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                self.grant_storage(&c, storage).await
            })
            .await
    }

    async fn grant_storage(&self, company: &Company, storage: StorageId) -> Result<(), ApplicationError> {
        debug!(company = %company.id, storage = %storage, "Granting storage access");
        self.ports
            .storages
            .grant(storage, company.all_employees())
            .await
    }
}
