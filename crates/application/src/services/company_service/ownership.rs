//! Property ownership of the legal identity
//!
//! The company learns about properties it gains through the world's
//! acquisition feed and about properties it loses through an owner watch
//! on every property it owns. At most one owned homestead is the company
//! headquarters; it is recorded as the legal identity's homestead.

use domain::{CompanyId, MemberId, Notice, OwnerChangeKind, Property, PropertyId, WorldPosition, headquarters_name};
use tracing::{debug, info, instrument, warn};

use super::{CompanyService, DesyncReport, Outcome};
use crate::{
    error::ApplicationError,
    ports::{ChangeEvent, WatchTarget},
};

impl CompanyService {
    /// Entry point of every watch registered for `company`
    pub(super) async fn handle_change(&self, company: CompanyId, event: ChangeEvent) {
        let result = match event {
            ChangeEvent::OwnerChanged {
                property,
                before,
                after,
            } => {
                self.locks
                    .exclusive(company, async {
                        if self.guards.for_company(company).owner_changes_suppressed() {
                            debug!(company = %company, property = %property, "Owner change suppressed");
                            return Ok(());
                        }
                        let c = self.company(company).await?;
                        let legal = Some(c.legal_identity());
                        if before == legal && after != legal {
                            self.on_lost_ownership(company, property).await?;
                        }
                        Ok(())
                    })
                    .await
            },
            ChangeEvent::CitizenshipChanged { before, after, .. } => {
                self.on_legal_identity_citizenship_changed(company, before, after)
                    .await
            },
            ChangeEvent::PropertyAcquired { .. } => Ok(()),
        };
        if let Err(e) = result {
            warn!(company = %company, ?event, error = %e, "Failed to handle change");
        }
    }

    /// A property was handed to some member; react if it is a legal identity
    pub(super) async fn on_property_acquired(&self, property: PropertyId, new_owner: MemberId) {
        let company = match self.company_by_legal_identity(new_owner).await {
            Ok(Some(company)) => company.id,
            Ok(None) => return,
            Err(e) => {
                warn!(property = %property, error = %e, "Failed to resolve acquiring company");
                return;
            },
        };
        let result = self
            .locks
            .exclusive(company, async {
                if self.guards.for_company(company).owner_changes_suppressed() {
                    debug!(company = %company, property = %property, "Acquisition suppressed");
                    return Ok(());
                }
                self.on_gained_ownership(company, property).await
            })
            .await;
        if let Err(e) = result {
            warn!(company = %company, property = %property, error = %e, "Failed to take ownership");
        }
    }

    /// Start tracking `property`, which the legal identity now owns
    #[instrument(skip(self))]
    pub async fn on_gained_ownership(
        &self,
        company: CompanyId,
        property: PropertyId,
    ) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                self.watch(company, WatchTarget::PropertyOwner(property))
                    .await?;
                let deed = self.property(property).await?;
                info!(company = %company, property = %property, "Company gained property");

                let deed = if deed.is_homestead() {
                    self.designate_headquarters(company, deed).await?
                } else {
                    self.messenger
                        .company(
                            &c,
                            Notice::government(format!(
                                "{} is now the owner of {}",
                                c.name, deed.name
                            )),
                        )
                        .await;
                    deed
                };
                self.apply_property_access(&c, deed).await?;
                self.invalidate_company(company).await;
                Ok(())
            })
            .await
    }

    /// Make `deed` the headquarters of `company`
    async fn designate_headquarters(
        &self,
        company: CompanyId,
        deed: Property,
    ) -> Result<Property, ApplicationError> {
        let c = self.company(company).await?;
        let mut legal = self.legal_member(&c).await?;

        if let Some(previous) = legal.homestead
            && previous != deed.id
        {
            self.release_plot_override(previous).await?;
        }
        legal.homestead = Some(deed.id);
        self.ports.members.update(&legal).await?;

        let previous_creator_citizenship = match deed.creator {
            Some(creator) if creator != legal.id => self
                .ports
                .members
                .get(creator)
                .await?
                .and_then(|m| m.citizenship),
            _ => None,
        };

        let name = self
            .ports
            .properties
            .rename(deed.id, &headquarters_name(&c.name))
            .await?;
        let mut deed = self.property(deed.id).await?;
        deed.name = name;
        deed.creator = Some(legal.id);
        deed.owner_label.clone_from(&legal.name);
        deed.allow_plots_unclaiming = true;
        let entitlement = self.entitlement_for(&c);
        if let Some(plots) = deed.plots.as_mut() {
            plots.apply_override(entitlement);
        }
        self.ports.properties.update(&deed).await?;

        self.set_citizen_of(company, deed.settlement.or(previous_creator_citizenship))
            .await?;
        if deed.settlement.is_none() {
            deed.settlement = self
                .ports
                .properties
                .refresh_settlement_influence(deed.id)
                .await?;
        }

        info!(company = %company, property = %deed.id, "Headquarters designated");
        self.messenger
            .company(
                &c,
                Notice::government(format!("{} is now the new HQ of {}", deed.name, c.name)),
            )
            .await;
        Ok(deed)
    }

    async fn release_plot_override(&self, property: PropertyId) -> Result<(), ApplicationError> {
        let Some(mut deed) = self.ports.properties.get(property).await? else {
            return Ok(());
        };
        let base = self.policy.base_plots_on_homestead;
        if deed.plots.as_mut().is_some_and(|p| p.remove_override(base)) {
            self.ports.properties.update(&deed).await?;
        }
        Ok(())
    }

    /// Stop tracking `property`, which the legal identity no longer owns
    #[instrument(skip(self))]
    pub async fn on_lost_ownership(
        &self,
        company: CompanyId,
        property: PropertyId,
    ) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                self.unwatch(company, WatchTarget::PropertyOwner(property))
                    .await?;
                let mut legal = self.legal_member(&c).await?;
                let was_headquarters = legal.homestead == Some(property);
                let deed = self.ports.properties.get(property).await?;
                let deed_name = deed
                    .as_ref()
                    .map_or_else(|| property.to_string(), |d| d.name.clone());
                info!(company = %company, property = %property, was_headquarters, "Company lost property");

                if was_headquarters {
                    self.release_plot_override(property).await?;
                    legal.homestead = None;
                    self.ports.members.update(&legal).await?;
                    self.messenger
                        .company(
                            &c,
                            Notice::government(format!(
                                "{deed_name} is no longer the HQ of {}",
                                c.name
                            )),
                        )
                        .await;
                } else {
                    self.messenger
                        .company(
                            &c,
                            Notice::government(format!(
                                "{} is no longer the owner of {deed_name}",
                                c.name
                            )),
                        )
                        .await;
                }

                // reload, the override release may have written it
                if let Some(mut deed) = self.ports.properties.get(property).await? {
                    if was_headquarters {
                        deed.resident_invitations.clear();
                    }
                    deed.accessors.clear();
                    self.ports.properties.update(&deed).await?;
                }
                if was_headquarters {
                    self.promote_remaining_homestead(company, legal.id, property)
                        .await?;
                }
                self.invalidate_company(company).await;
                Ok(())
            })
            .await
    }

    /// Designate another owned homestead after the headquarters was lost
    async fn promote_remaining_homestead(
        &self,
        company: CompanyId,
        legal: MemberId,
        lost: PropertyId,
    ) -> Result<(), ApplicationError> {
        let remaining = self
            .ports
            .properties
            .owned_by(legal)
            .await?
            .into_iter()
            .find(|p| p.id != lost && p.is_homestead());
        if let Some(deed) = remaining {
            debug!(company = %company, property = %deed.id, "Falling back to remaining homestead");
            let deed = self.designate_headquarters(company, deed).await?;
            let c = self.company(company).await?;
            self.apply_property_access(&c, deed).await?;
        }
        Ok(())
    }

    /// Compare the recorded headquarters with the owned homesteads and repair
    #[instrument(skip(self))]
    pub async fn reconcile_desync(&self, company: CompanyId) -> Result<DesyncReport, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let legal = self.legal_member(&c).await?;
                let owned = self.ports.properties.owned_by(legal.id).await?;
                let first_homestead = owned.into_iter().find(Property::is_homestead);

                match (first_homestead, legal.homestead) {
                    (None, Some(recorded)) => {
                        let name = match self.ports.properties.get(recorded).await? {
                            Some(p) => p.name,
                            None => recorded.to_string(),
                        };
                        warn!(company = %company, property = %recorded, "Headquarters recorded but not owned");
                        self.on_lost_ownership(company, recorded).await?;
                        Ok(DesyncReport::corrected(format!(
                            "Detected incorrectly assigned HQ deed '{name}' (deed was not owned by legal person), clearing..."
                        )))
                    },
                    (Some(homestead), recorded) if recorded != Some(homestead.id) => {
                        warn!(company = %company, property = %homestead.id, "Owned homestead not recorded as headquarters");
                        self.on_gained_ownership(company, homestead.id).await?;
                        Ok(DesyncReport::corrected(format!(
                            "Detected unassigned HQ deed '{}' (deed was owned by legal person but not set as homestead), updating...",
                            homestead.name
                        )))
                    },
                    _ => Ok(DesyncReport::consistent()),
                }
            })
            .await
    }

    /// Hand the property claimed at `position` to the company
    ///
    /// Vehicles and homesteads cannot be claimed this way.
    #[instrument(skip(self))]
    pub async fn take_claim(
        &self,
        company: CompanyId,
        issuer: MemberId,
        position: WorldPosition,
        name: Option<String>,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let deed = match self.ports.properties.at_position(position).await? {
                    Some(deed) if !deed.is_vehicle() && !deed.is_homestead() => deed,
                    _ => {
                        return Err(ApplicationError::Rejected(format!(
                            "There is no claim at {position} that {} can take",
                            c.name
                        )));
                    },
                };
                let mut deed_name = deed.name.clone();
                if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
                    deed_name = self.ports.properties.rename(deed.id, &name).await?;
                }

                // observed on purpose so the acquisition reaches the company
                self.ports
                    .properties
                    .transfer(deed.id, Some(c.legal_identity()), OwnerChangeKind::Normal)
                    .await?;
                info!(company = %company, member = %issuer, property = %deed.id, "Claim taken");
                self.refresh_all_access(company).await?;
                self.invalidate_company(company).await;
                Ok(Outcome::new(format!("{} now owns {deed_name}", c.name)))
            })
            .await
    }

    /// Open the rent editor of `property` for `editor`
    ///
    /// The property is lent to the editor for the duration of the edit and
    /// handed back afterwards, without the company reacting to either move.
    #[instrument(skip(self))]
    pub async fn edit_rent(
        &self,
        company: CompanyId,
        property: PropertyId,
        editor: MemberId,
    ) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let deed = self.property(property).await?;
                let guards = self.guards.for_company(company);
                let _suppressed = guards.suppress_owner_changes();

                self.ports
                    .properties
                    .transfer(property, Some(editor), OwnerChangeKind::AdminCommand)
                    .await?;
                let edited = self.ports.properties.open_rent_editor(property, editor).await;
                let restored = self
                    .ports
                    .properties
                    .transfer(property, deed.owner, OwnerChangeKind::AdminCommand)
                    .await;
                edited?;
                restored
            })
            .await
    }

    /// Repairs after every company was initialized
    #[instrument(skip(self))]
    pub async fn post_initialize(&self, company: CompanyId) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                self.refresh_headquarters_plots(company).await?;
                let c = self.company(company).await?;
                if let Some(mut hq) = self.headquarters(&c).await?
                    && hq.creator != Some(c.legal_identity())
                {
                    debug!(company = %company, property = %hq.id, "Fixing headquarters creator");
                    hq.creator = Some(c.legal_identity());
                    self.ports.properties.update(&hq).await?;
                }
                Ok(())
            })
            .await
    }
}
