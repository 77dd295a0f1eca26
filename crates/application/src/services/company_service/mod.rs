//! Company service - the consistency protocol of the company aggregate
//!
//! This module is split into focused sub-modules:
//! - [`roster`]: invitations, joining, leaving, firing and leadership changes
//! - [`ownership`]: property gain/loss, headquarters designation, claims and rent edits
//! - [`entitlement`]: headquarters plot sizing
//! - [`access`]: access lists of owned properties, accounts and storages
//! - [`citizenship`]: settlement citizenship of the company and its employees
//! - [`reputation`]: averaging employee reputation onto the legal identity
//! - [`finance`]: money relays and wealth-change coalescing
//! - [`vehicles`]: handing employee vehicles to the company
//! - [`activity`]: online state and play time of the legal identity
//! - [`lifecycle`]: founding, initialization, lookups and dissolution
//!
//! Every mutating operation on one company runs under that company's lock.
//! After a roster change the employee cascade runs in a fixed order:
//! headquarters plots, vehicles, access lists, storages, reputation and
//! citizenship.

mod access;
mod activity;
mod citizenship;
mod concurrency;
mod entitlement;
mod finance;
mod lifecycle;
mod listeners;
mod messaging;
mod ownership;
mod reputation;
mod roster;
mod vehicles;

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
};

use domain::{Company, CompanyId, Member, MemberId, Property, PropertyId};
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

pub use concurrency::RelayKind;
pub use lifecycle::CompanyOverview;

use self::{
    concurrency::{CompanyLocks, GuardTable},
    listeners::{AcquisitionListener, CompanyChangeListener},
    messaging::CompanyMessenger,
};
use crate::{
    error::ApplicationError,
    policy::CompanyPolicy,
    ports::{ChangeListener, CompanyPorts, DisplayScope, WatchHandle, WatchTarget},
};

/// Result of a successful user-facing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Message for the invoking player
    pub message: String,
}

impl Outcome {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a self-check that repairs what it finds
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DesyncReport {
    pub corrected: bool,
    pub description: String,
}

impl DesyncReport {
    pub fn consistent() -> Self {
        Self::default()
    }

    pub fn corrected(description: impl Into<String>) -> Self {
        Self {
            corrected: true,
            description: description.into(),
        }
    }
}

/// Service keeping every company consistent with the world
pub struct CompanyService {
    pub(super) ports: CompanyPorts,
    pub(super) policy: CompanyPolicy,
    pub(super) messenger: CompanyMessenger,
    pub(super) locks: CompanyLocks,
    pub(super) guards: GuardTable,
    /// Active subscriptions per company
    pub(super) watches: Mutex<HashMap<CompanyId, HashMap<WatchTarget, WatchHandle>>>,
    pub(super) acquisitions: Mutex<Option<WatchHandle>>,
    pub(super) this: Weak<Self>,
}

impl fmt::Debug for CompanyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanyService")
            .field("policy", &self.policy)
            .field("watched_companies", &self.watches.lock().len())
            .finish_non_exhaustive()
    }
}

impl CompanyService {
    /// Create a new company service
    pub fn new(ports: CompanyPorts, policy: CompanyPolicy) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            messenger: CompanyMessenger::new(Arc::clone(&ports.messaging)),
            ports,
            policy,
            locks: CompanyLocks::default(),
            guards: GuardTable::default(),
            watches: Mutex::new(HashMap::new()),
            acquisitions: Mutex::new(None),
            this: this.clone(),
        })
    }

    pub const fn policy(&self) -> &CompanyPolicy {
        &self.policy
    }

    /// Subscribe to property acquisitions and initialize every registered company
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), ApplicationError> {
        if self.acquisitions.lock().is_none() {
            let listener: Arc<dyn ChangeListener> =
                Arc::new(AcquisitionListener::new(self.this.clone()));
            let handle = self
                .ports
                .feed
                .watch(WatchTarget::Acquisitions, listener)
                .await?;
            *self.acquisitions.lock() = Some(handle);
        }

        for company in self.ports.registry.all().await? {
            self.initialize(company.id).await?;
            self.post_initialize(company.id).await?;
        }
        Ok(())
    }

    /// Release the acquisition subscription
    pub async fn stop(&self) -> Result<(), ApplicationError> {
        let handle = self.acquisitions.lock().take();
        if let Some(handle) = handle {
            self.ports.feed.unwatch(handle).await?;
        }
        Ok(())
    }

    pub(super) async fn company(&self, id: CompanyId) -> Result<Company, ApplicationError> {
        self.ports
            .registry
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Company", id))
    }

    pub(super) async fn member(&self, id: MemberId) -> Result<Member, ApplicationError> {
        self.ports
            .members
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Member", id))
    }

    pub(super) async fn legal_member(&self, company: &Company) -> Result<Member, ApplicationError> {
        self.ports
            .members
            .get(company.legal_identity())
            .await?
            .ok_or_else(|| {
                ApplicationError::InternalLookup(format!(
                    "legal identity {} of company {} is missing",
                    company.legal_identity(),
                    company.id
                ))
            })
    }

    pub(super) async fn property(&self, id: PropertyId) -> Result<Property, ApplicationError> {
        self.ports
            .properties
            .get(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Property", id))
    }

    /// Name of a member for messages, falling back to its ID
    pub(super) async fn member_name(&self, id: MemberId) -> String {
        match self.ports.members.get(id).await {
            Ok(Some(member)) => member.name,
            _ => id.to_string(),
        }
    }

    pub(super) async fn invalidate_company(&self, company: CompanyId) {
        self.ports
            .display
            .invalidate(DisplayScope::Company(company))
            .await;
    }

    pub(super) async fn invalidate_member_view(&self, company: CompanyId, member: MemberId) {
        self.ports
            .display
            .invalidate(DisplayScope::MemberView { company, member })
            .await;
    }

    pub(super) async fn watch(
        &self,
        company: CompanyId,
        target: WatchTarget,
    ) -> Result<(), ApplicationError> {
        let already = self
            .watches
            .lock()
            .get(&company)
            .is_some_and(|w| w.contains_key(&target));
        if already {
            return Ok(());
        }
        let listener: Arc<dyn ChangeListener> =
            Arc::new(CompanyChangeListener::new(company, self.this.clone()));
        let handle = self.ports.feed.watch(target, listener).await?;
        self.watches
            .lock()
            .entry(company)
            .or_default()
            .insert(target, handle);
        debug!(company = %company, ?target, "Watching");
        Ok(())
    }

    pub(super) async fn unwatch(
        &self,
        company: CompanyId,
        target: WatchTarget,
    ) -> Result<(), ApplicationError> {
        let handle = self
            .watches
            .lock()
            .get_mut(&company)
            .and_then(|w| w.remove(&target));
        if let Some(handle) = handle {
            self.ports.feed.unwatch(handle).await?;
            debug!(company = %company, ?target, "Stopped watching");
        }
        Ok(())
    }

    /// Whether `target` is currently watched for `company`
    pub fn is_watching(&self, company: CompanyId, target: WatchTarget) -> bool {
        self.watches
            .lock()
            .get(&company)
            .is_some_and(|w| w.contains_key(&target))
    }

    /// Restore every roster-derived invariant after the employees changed
    ///
    /// Each step runs even when an earlier one failed; the first failure is
    /// returned after all of them were attempted.
    #[instrument(skip(self))]
    pub(super) async fn on_employees_changed(
        &self,
        company: CompanyId,
    ) -> Result<(), ApplicationError> {
        let mut first_error = None;
        note_step(
            &mut first_error,
            company,
            "headquarters plots",
            self.refresh_headquarters_plots(company).await,
        );
        note_step(
            &mut first_error,
            company,
            "vehicles",
            self.update_all_vehicles(company).await,
        );
        note_step(
            &mut first_error,
            company,
            "access lists",
            self.refresh_all_access(company).await,
        );
        note_step(
            &mut first_error,
            company,
            "storages",
            self.refresh_storages(company).await,
        );
        note_step(
            &mut first_error,
            company,
            "reputation",
            self.refresh_reputation(company).await,
        );
        note_step(
            &mut first_error,
            company,
            "citizenship",
            self.reconcile_citizenships(company).await,
        );
        self.invalidate_company(company).await;
        first_error.map_or(Ok(()), Err)
    }
}

fn note_step(
    first_error: &mut Option<ApplicationError>,
    company: CompanyId,
    step: &str,
    result: Result<(), ApplicationError>,
) {
    if let Err(e) = result {
        warn!(company = %company, step, error = %e, "Employee cascade step failed");
        if first_error.is_none() {
            *first_error = Some(e);
        }
    }
}
