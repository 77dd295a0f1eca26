//! Founding, initialization, registrar lookups and dissolution

use domain::{
    AccountId, Company, CompanyAssets, CompanyId, DomainError, MemberId, MembershipStatus,
    PropertyId, SettlementId, ShareholderHolding, legal_identity_name, share_currency_name,
    treasury_account_name,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::CompanyService;
use crate::{error::ApplicationError, ports::WatchTarget};

/// Everything a company view shows, as data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyOverview {
    pub company: CompanyId,
    pub name: String,
    pub leader: Option<MemberId>,
    pub members: Vec<MemberId>,
    pub accounts: Vec<AccountId>,
    pub headquarters: Option<PropertyId>,
    /// Owned properties other than the headquarters
    pub properties: Vec<PropertyId>,
    pub shareholders: Vec<ShareholderHolding>,
    pub citizenship: Option<SettlementId>,
    pub legal_identity: MemberId,
}

impl CompanyService {
    /// Found a company led by `founder`
    ///
    /// Allocates the legal identity, the treasury and the share currency.
    #[instrument(skip(self))]
    pub async fn found_company(
        &self,
        founder: MemberId,
        name: &str,
    ) -> Result<Company, ApplicationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationError("company name must not be empty".into()).into());
        }
        let existing = self.ports.registry.all().await?;
        if existing.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(ApplicationError::Rejected(format!(
                "Couldn't found {name} as a company with that name already exists."
            )));
        }
        if let Some(employer) = existing.iter().find(|c| c.is_employee(founder)) {
            return Err(ApplicationError::Rejected(format!(
                "Couldn't found {name} as you are already employed by {}. You must leave {} first.",
                employer.name, employer.name
            )));
        }

        let now = self.ports.clock.now_seconds();
        let legal = self
            .ports
            .provisioning
            .create_legal_identity(&legal_identity_name(name), now)
            .await?;
        let treasury = self
            .ports
            .provisioning
            .open_treasury(legal.id, &treasury_account_name(name))
            .await?;
        let share_currency = self
            .ports
            .provisioning
            .issue_currency(legal.id, &share_currency_name(name))
            .await?;

        let company = Company::found(
            name,
            founder,
            CompanyAssets {
                legal_identity: legal.id,
                treasury: treasury.id,
                share_currency,
            },
        );
        self.ports.registry.save(&company).await?;
        self.apply_account_access(&company, treasury).await?;
        self.initialize(company.id).await?;
        info!(company = %company.id, name = %company.name, founder = %founder, "Company founded");
        Ok(company)
    }

    /// Establish the change subscriptions of `company`; safe to repeat
    #[instrument(skip(self))]
    pub async fn initialize(&self, company: CompanyId) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let legal = c.legal_identity();
                self.watch(company, WatchTarget::Citizenship(legal)).await?;
                for deed in self.ports.properties.owned_by(legal).await? {
                    self.watch(company, WatchTarget::PropertyOwner(deed.id))
                        .await?;
                }
                Ok(())
            })
            .await
    }

    /// Release every subscription and pending task, then deregister
    #[instrument(skip(self))]
    pub async fn dissolve(&self, company: CompanyId) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let targets: Vec<WatchTarget> = self
                    .watches
                    .lock()
                    .get(&company)
                    .map(|w| w.keys().copied().collect())
                    .unwrap_or_default();
                for target in targets {
                    self.unwatch(company, target).await?;
                }
                self.watches.lock().remove(&company);
                let cancelled = self.ports.deferred.cancel_company(company);
                self.ports.registry.remove(company).await?;
                info!(company = %company, name = %c.name, cancelled, "Company dissolved");
                Ok::<_, ApplicationError>(())
            })
            .await?;
        self.locks.forget(company);
        self.guards.forget(company);
        Ok(())
    }

    /// Company employing `member`, if any
    pub async fn employer_of(&self, member: MemberId) -> Result<Option<Company>, ApplicationError> {
        Ok(self
            .ports
            .registry
            .all()
            .await?
            .into_iter()
            .find(|c| c.is_employee(member)))
    }

    pub async fn company_by_legal_identity(
        &self,
        member: MemberId,
    ) -> Result<Option<Company>, ApplicationError> {
        Ok(self
            .ports
            .registry
            .all()
            .await?
            .into_iter()
            .find(|c| c.legal_identity() == member))
    }

    /// Company owning `account`, see [`Self::does_own_account`]
    pub async fn company_by_account(
        &self,
        account: AccountId,
    ) -> Result<Option<Company>, ApplicationError> {
        for company in self.ports.registry.all().await? {
            if self.does_own_account(&company, account).await? {
                return Ok(Some(company));
            }
        }
        Ok(None)
    }

    /// Company whose headquarters is `property`
    pub async fn company_by_headquarters(
        &self,
        property: PropertyId,
    ) -> Result<Option<Company>, ApplicationError> {
        for company in self.ports.registry.all().await? {
            if let Some(legal) = self.ports.members.get(company.legal_identity()).await?
                && legal.homestead == Some(property)
            {
                return Ok(Some(company));
            }
        }
        Ok(None)
    }

    pub async fn is_invited(
        &self,
        member: MemberId,
        company: CompanyId,
    ) -> Result<bool, ApplicationError> {
        Ok(self.company(company).await?.is_invited(member))
    }

    /// The treasury, or a shared account the legal identity manages
    pub async fn does_own_account(
        &self,
        company: &Company,
        account: AccountId,
    ) -> Result<bool, ApplicationError> {
        if account == company.treasury() {
            return Ok(true);
        }
        Ok(self
            .ports
            .accounts
            .get(account)
            .await?
            .is_some_and(|a| a.is_shared() && a.is_managed_by(company.legal_identity())))
    }

    pub async fn membership_status(
        &self,
        company: CompanyId,
        member: MemberId,
    ) -> Result<MembershipStatus, ApplicationError> {
        Ok(self.company(company).await?.membership_status(member))
    }

    pub async fn shareholders(
        &self,
        company: CompanyId,
    ) -> Result<Vec<ShareholderHolding>, ApplicationError> {
        Ok(self.company(company).await?.shareholders())
    }

    #[instrument(skip(self))]
    pub async fn overview(&self, company: CompanyId) -> Result<CompanyOverview, ApplicationError> {
        let c = self.company(company).await?;
        let legal = self.legal_member(&c).await?;
        let headquarters = self.headquarters(&c).await?.map(|hq| hq.id);
        let properties = self
            .ports
            .properties
            .owned_by(legal.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .filter(|id| Some(*id) != headquarters)
            .collect();
        let accounts = self
            .owned_accounts(&c)
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        Ok(CompanyOverview {
            company,
            name: c.name.clone(),
            leader: c.leader(),
            members: c.members().collect(),
            accounts,
            headquarters,
            properties,
            shareholders: c.shareholders(),
            citizenship: legal.citizenship,
            legal_identity: legal.id,
        })
    }
}
