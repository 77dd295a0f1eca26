//! Roster transitions
//!
//! Regular transitions are checked here, then submitted to the action
//! pipeline, and only applied once the pipeline accepts them. The
//! administrative `force_*` variants skip the pipeline. Every mutation is
//! gated on whether the roster actually changed, so a duplicate delivery
//! never runs the employee cascade twice.

use domain::{ActionPack, ActionVerdict, CompanyError, CompanyId, GameAction, MemberId, Notice};
use tracing::{info, instrument};

use super::{CompanyService, Outcome};
use crate::error::ApplicationError;

impl CompanyService {
    /// Invite `target` to the company; only the leader may invite
    #[instrument(skip(self))]
    pub async fn invite(
        &self,
        company: CompanyId,
        invoker: MemberId,
        target: MemberId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let mut c = self.company(company).await?;
                let target_member = self.member(target).await?;
                c.ensure_can_invite(invoker, &target_member)?;
                if !c.add_invitee(target) {
                    return Ok(Outcome::new(format!("{} is already invited", target_member.name)));
                }
                self.ports.registry.save(&c).await?;
                self.invalidate_company(company).await;
                self.invalidate_member_view(company, target).await;

                self.messenger
                    .mail(
                        target,
                        Notice::government(format!(
                            "You have been invited to join {name}\n\nTo accept use /company join {name}\nTo reject use /company reject {name}",
                            name = c.name
                        )),
                    )
                    .await;
                let invoker_name = self.member_name(invoker).await;
                self.messenger
                    .company(
                        &c,
                        Notice::government(format!(
                            "{invoker_name} has invited {} to join the company.",
                            target_member.name
                        )),
                    )
                    .await;
                info!(company = %company, member = %target, "Member invited");
                Ok(Outcome::new(format!("Invited {} to {}", target_member.name, c.name)))
            })
            .await
    }

    /// Withdraw `target`'s invitation; only the leader may do so
    #[instrument(skip(self))]
    pub async fn revoke_invite(
        &self,
        company: CompanyId,
        invoker: MemberId,
        target: MemberId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let mut c = self.company(company).await?;
                let target_member = self.member(target).await?;
                c.ensure_can_revoke(invoker, &target_member)?;
                if c.remove_invitee(target) {
                    self.ports.registry.save(&c).await?;
                    self.invalidate_company(company).await;
                    self.invalidate_member_view(company, target).await;
                    let invoker_name = self.member_name(invoker).await;
                    self.messenger
                        .company(
                            &c,
                            Notice::government(format!(
                                "{invoker_name} has withdrawn the invitation for {} to join the company.",
                                target_member.name
                            )),
                        )
                        .await;
                }
                Ok(Outcome::new(format!(
                    "Withdrew the invitation of {} to {}",
                    target_member.name, c.name
                )))
            })
            .await
    }

    /// Accept an invitation
    #[instrument(skip(self))]
    pub async fn join(
        &self,
        company: CompanyId,
        target: MemberId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let target_member = self.member(target).await?;
                if let Some(employer) = self.employer_of(target).await?
                    && employer.id != company
                {
                    return Err(CompanyError::AlreadyEmployedElsewhere {
                        company: c.name.clone(),
                        employer: employer.name,
                    }
                    .into());
                }
                c.ensure_can_join(&target_member)?;
                if self.policy.property_limits_enabled
                    && let Some(homestead) = target_member.homestead
                {
                    let homestead_name = match self.ports.properties.get(homestead).await? {
                        Some(p) => p.name,
                        None => homestead.to_string(),
                    };
                    return Err(CompanyError::PropertyConflict {
                        company: c.name.clone(),
                        homestead: homestead_name,
                    }
                    .into());
                }

                self.submit(GameAction::CitizenJoinCompany {
                    citizen: target,
                    company_legal_identity: c.legal_identity(),
                })
                .await?;

                // post-commit
                let mut c = self.company(company).await?;
                if !c.remove_invitee(target) || !c.add_member(target) {
                    return Ok(Outcome::new(format!("Already joined {}", c.name)));
                }
                self.ports.registry.save(&c).await?;
                info!(company = %company, member = %target, "Member joined");
                self.on_employees_changed(company).await?;
                self.invalidate_member_view(company, target).await;
                let c = self.company(company).await?;
                self.messenger
                    .company(
                        &c,
                        Notice::government(format!("{} has joined the company.", target_member.name)),
                    )
                    .await;
                Ok(Outcome::new(format!("Joined {}", c.name)))
            })
            .await
    }

    /// Resign from the company; the leader cannot resign
    #[instrument(skip(self))]
    pub async fn leave(
        &self,
        company: CompanyId,
        target: MemberId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let target_member = self.member(target).await?;
                c.ensure_can_leave(&target_member)?;
                self.depart(
                    company,
                    target,
                    false,
                    format!("{} has resigned from the company.", target_member.name),
                )
                .await?;
                Ok(Outcome::new(format!("Resigned from {}", c.name)))
            })
            .await
    }

    /// Remove an employee against their will; only the leader may fire
    #[instrument(skip(self))]
    pub async fn fire(
        &self,
        company: CompanyId,
        invoker: MemberId,
        target: MemberId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let target_member = self.member(target).await?;
                c.ensure_can_fire(invoker, &target_member)?;
                let invoker_name = self.member_name(invoker).await;
                self.depart(
                    company,
                    target,
                    true,
                    format!(
                        "{invoker_name} has fired {} from the company.",
                        target_member.name
                    ),
                )
                .await?;
                Ok(Outcome::new(format!(
                    "Fired {} from {}",
                    target_member.name, c.name
                )))
            })
            .await
    }

    async fn depart(
        &self,
        company: CompanyId,
        target: MemberId,
        fired: bool,
        announcement: String,
    ) -> Result<(), ApplicationError> {
        let c = self.company(company).await?;
        self.submit(GameAction::CitizenLeaveCompany {
            citizen: target,
            company_legal_identity: c.legal_identity(),
            fired,
        })
        .await?;

        // post-commit
        let mut c = self.company(company).await?;
        if !c.remove_member(target) {
            return Ok(());
        }
        self.ports.registry.save(&c).await?;
        info!(company = %company, member = %target, fired, "Member left");
        self.on_employees_changed(company).await?;
        self.invalidate_member_view(company, target).await;
        self.messenger.company(&c, Notice::government(announcement)).await;
        Ok(())
    }

    async fn submit(&self, action: GameAction) -> Result<(), ApplicationError> {
        let name = action.name();
        match self.ports.pipeline.perform(ActionPack::single(action)).await? {
            ActionVerdict::Accepted => Ok(()),
            ActionVerdict::Rejected { reason } => {
                info!(action = name, %reason, "Action rejected");
                Err(ApplicationError::Rejected(reason))
            },
        }
    }

    /// Add `target` without validation, taking them out of any other company first
    ///
    /// Returns whether the roster changed.
    #[instrument(skip(self))]
    pub async fn force_join(
        &self,
        company: CompanyId,
        target: MemberId,
    ) -> Result<bool, ApplicationError> {
        if let Some(employer) = self.employer_of(target).await?
            && employer.id != company
        {
            self.force_leave(employer.id, target).await?;
        }

        self.locks
            .exclusive(company, async {
                let mut c = self.company(company).await?;
                if c.is_employee(target) || !c.add_member(target) {
                    return Ok(false);
                }
                self.ports.registry.save(&c).await?;
                info!(company = %company, member = %target, "Member force-joined");
                self.on_employees_changed(company).await?;
                self.invalidate_member_view(company, target).await;
                let name = self.member_name(target).await;
                let c = self.company(company).await?;
                self.messenger
                    .company(&c, Notice::government(format!("{name} has joined the company.")))
                    .await;
                Ok(true)
            })
            .await
    }

    /// Remove `target` without validation; the leader is never removed
    ///
    /// Returns whether the roster changed.
    #[instrument(skip(self))]
    pub async fn force_leave(
        &self,
        company: CompanyId,
        target: MemberId,
    ) -> Result<bool, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let mut c = self.company(company).await?;
                if c.is_leader(target) || !c.remove_member(target) {
                    return Ok(false);
                }
                self.ports.registry.save(&c).await?;
                info!(company = %company, member = %target, "Member ejected");
                self.on_employees_changed(company).await?;
                self.invalidate_member_view(company, target).await;
                let name = self.member_name(target).await;
                self.messenger
                    .company(
                        &c,
                        Notice::government(format!("{name} has been ejected from the company.")),
                    )
                    .await;
                Ok(true)
            })
            .await
    }

    /// Make `new_leader` the leader; the previous leader becomes a member
    #[instrument(skip(self))]
    pub async fn promote(
        &self,
        company: CompanyId,
        new_leader: MemberId,
    ) -> Result<bool, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let mut c = self.company(company).await?;
                let previous = c.leader();
                if !c.promote(new_leader) {
                    return Ok(false);
                }
                self.ports.registry.save(&c).await?;
                info!(company = %company, member = %new_leader, "Leader changed");
                self.invalidate_member_view(company, new_leader).await;
                if let Some(previous) = previous {
                    self.invalidate_member_view(company, previous).await;
                }
                self.on_employees_changed(company).await?;
                let name = self.member_name(new_leader).await;
                self.messenger
                    .global(Notice::government(format!(
                        "{name} is now the CEO of {}!",
                        c.name
                    )))
                    .await;
                Ok(true)
            })
            .await
    }

    /// Step the current leader down; false when `current` is not the leader
    #[instrument(skip(self))]
    pub async fn demote(
        &self,
        company: CompanyId,
        current: MemberId,
    ) -> Result<bool, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let mut c = self.company(company).await?;
                if !c.demote(current) {
                    return Ok(false);
                }
                self.ports.registry.save(&c).await?;
                info!(company = %company, member = %current, "Leader stepped down");
                let name = self.member_name(current).await;
                self.messenger
                    .company(&c, Notice::government(format!("{name} has been removed as CEO.")))
                    .await;
                self.invalidate_company(company).await;
                self.invalidate_member_view(company, current).await;
                Ok(true)
            })
            .await
    }
}
