//! Settlement citizenship of the company and its employees
//!
//! The legal identity's citizenship is the company's citizenship. With
//! property limits enabled, every employee is kept on the same settlement
//! roster; those moves are employer driven and do not count against the
//! settlement's immigration limits.

use domain::{
    Company, CompanyError, CompanyId, Eligibility, Member, MemberId, Notice, SettlementId,
};
use tracing::{debug, info, instrument, warn};

use super::{CompanyService, DesyncReport, Outcome};
use crate::error::ApplicationError;

impl CompanyService {
    async fn settlement_name(&self, id: SettlementId) -> String {
        match self.ports.settlements.get(id).await {
            Ok(Some(settlement)) => settlement.name,
            _ => id.to_string(),
        }
    }

    /// The legal identity moved between settlements
    pub(super) async fn on_legal_identity_citizenship_changed(
        &self,
        company: CompanyId,
        before: Option<SettlementId>,
        after: Option<SettlementId>,
    ) -> Result<(), ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let before_name = match before {
                    Some(id) => Some(self.settlement_name(id).await),
                    None => None,
                };
                let after_name = match after {
                    Some(id) => Some(self.settlement_name(id).await),
                    None => None,
                };
                let text = match (before_name, after_name) {
                    (Some(before), Some(after)) => Some(format!(
                        "{} has left {before} and joined {after}.",
                        c.name
                    )),
                    (Some(before), None) => Some(format!("{} has left {before}.", c.name)),
                    (None, Some(after)) => Some(format!("{} has joined {after}.", c.name)),
                    (None, None) => None,
                };
                if let Some(text) = text {
                    info!(company = %company, ?before, ?after, "Company citizenship changed");
                    self.messenger.company(&c, Notice::government(text)).await;
                }
                self.reconcile_citizenships(company).await?;
                self.invalidate_company(company).await;
                Ok(())
            })
            .await
    }

    /// Put every employee on the company's settlement roster
    #[instrument(skip(self))]
    pub(super) async fn reconcile_citizenships(
        &self,
        company: CompanyId,
    ) -> Result<(), ApplicationError> {
        if !self.policy.property_limits_enabled {
            return Ok(());
        }
        let c = self.company(company).await?;
        let target = self.legal_member(&c).await?.citizenship;
        for employee in c.all_employees() {
            let member = self.member(employee).await?;
            self.reconcile_member(&member, target).await?;
        }
        Ok(())
    }

    async fn reconcile_member(
        &self,
        member: &Member,
        target: Option<SettlementId>,
    ) -> Result<(), ApplicationError> {
        match (member.citizenship, target) {
            (current, Some(target)) if current != Some(target) => {
                if let Some(current) = current {
                    self.ports
                        .settlements
                        .release(current, member.id, true)
                        .await?;
                }
                debug!(member = %member.id, settlement = %target, "Moving employee to company settlement");
                self.ports.settlements.admit(target, member.id, true).await
            },
            (Some(current), None) => {
                debug!(member = %member.id, settlement = %current, "Removing employee from settlement");
                self.ports
                    .settlements
                    .release(current, member.id, true)
                    .await
            },
            _ => Ok(()),
        }
    }

    /// Compare the recorded citizenship with the settlement rosters and repair
    #[instrument(skip(self))]
    pub async fn check_citizenship_desync(
        &self,
        company: CompanyId,
    ) -> Result<DesyncReport, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let legal = self.legal_member(&c).await?;

                if let Some(recorded) = legal.citizenship
                    && !self.ports.settlements.has_citizen(recorded, legal.id).await?
                {
                    let name = self.settlement_name(recorded).await;
                    warn!(company = %company, settlement = %recorded, "Citizenship recorded but not on roster");
                    self.ports.members.set_citizenship(legal.id, None).await?;
                    return Ok(DesyncReport::corrected(format!(
                        "{} was a citizen of {name} but not on the roster, removing...",
                        c.name
                    )));
                }

                for settlement in self.ports.settlements.all().await? {
                    if !self
                        .ports
                        .settlements
                        .has_citizen(settlement.id, legal.id)
                        .await?
                    {
                        continue;
                    }
                    if legal.citizenship == Some(settlement.id) {
                        break;
                    }
                    warn!(company = %company, settlement = %settlement.id, "On roster but citizenship not recorded");
                    self.ports
                        .members
                        .set_citizenship(legal.id, Some(settlement.id))
                        .await?;
                    return Ok(DesyncReport::corrected(format!(
                        "{} was on the roster for {} but not a citizen of, updating...",
                        c.name, settlement.name
                    )));
                }
                Ok(DesyncReport::consistent())
            })
            .await
    }

    /// Move the legal identity to `settlement`
    pub(super) async fn set_citizen_of(
        &self,
        company: CompanyId,
        settlement: Option<SettlementId>,
    ) -> Result<(), ApplicationError> {
        let c = self.company(company).await?;
        let legal = self.legal_member(&c).await?;
        if legal.citizenship == settlement {
            return Ok(());
        }
        if let Some(current) = legal.citizenship {
            self.ports
                .settlements
                .release(current, legal.id, false)
                .await?;
        }
        if let Some(target) = settlement {
            self.ports.settlements.admit(target, legal.id, true).await?;
        }
        self.ports
            .members
            .set_citizenship(legal.id, settlement)
            .await
    }

    /// Whether the legal identity may become a citizen of `settlement`
    pub async fn can_join(
        &self,
        company: CompanyId,
        settlement: SettlementId,
    ) -> Result<Eligibility, ApplicationError> {
        let c = self.company(company).await?;
        let legal = c.legal_identity();
        let immigration = self
            .ports
            .settlements
            .check_immigration(settlement, legal)
            .await?;
        if !immigration.is_allowed() {
            return Ok(immigration);
        }
        match self
            .ports
            .settlements
            .check_roster_eligibility(settlement, legal)
            .await?
        {
            Eligibility::Allowed => Ok(Eligibility::Allowed),
            Eligibility::Denied(reason) => {
                let name = self.settlement_name(settlement).await;
                Ok(Eligibility::denied(format!("Couldn't join {name} as {reason}")))
            },
        }
    }

    /// Whether the legal identity may leave its current settlement
    pub async fn can_leave(&self, company: CompanyId) -> Result<Eligibility, ApplicationError> {
        let c = self.company(company).await?;
        let legal = self.legal_member(&c).await?;
        let Some(current) = legal.citizenship else {
            return Ok(Eligibility::denied(format!(
                "{} is not currently part of any settlement.",
                c.name
            )));
        };
        let top = self.top_settlement(current).await?;
        for settlement in self.ports.settlements.family(top).await? {
            let check = self
                .ports
                .settlements
                .check_leave_with_properties(settlement, legal.id)
                .await?;
            if !check.is_allowed() {
                return Ok(check);
            }
        }
        match self
            .ports
            .settlements
            .check_homestead_leave(current, legal.id)
            .await?
        {
            Eligibility::Allowed => Ok(Eligibility::Allowed),
            Eligibility::Denied(reason) => {
                let name = self.settlement_name(current).await;
                Ok(Eligibility::denied(format!("Couldn't leave {name} as {reason}")))
            },
        }
    }

    async fn top_settlement(&self, settlement: SettlementId) -> Result<SettlementId, ApplicationError> {
        let mut current = settlement;
        let mut seen = vec![current];
        while let Some(parent) = self
            .ports
            .settlements
            .get(current)
            .await?
            .and_then(|s| s.parent)
        {
            if seen.contains(&parent) {
                break;
            }
            seen.push(parent);
            current = parent;
        }
        Ok(current)
    }

    fn ensure_leader(
        company: &Company,
        invoker: MemberId,
        action: String,
    ) -> Result<(), ApplicationError> {
        if company.is_leader(invoker) {
            Ok(())
        } else {
            Err(CompanyError::NotAuthorized {
                action,
                company: company.name.clone(),
            }
            .into())
        }
    }

    /// Apply for citizenship of `settlement` on behalf of the company
    #[instrument(skip(self))]
    pub async fn apply_to_settlement(
        &self,
        company: CompanyId,
        invoker: MemberId,
        settlement: SettlementId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let target = self
                    .ports
                    .settlements
                    .get(settlement)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Settlement", settlement))?;
                Self::ensure_leader(&c, invoker, format!("apply to join {}", target.name))?;
                let legal = c.legal_identity();
                if !self.ports.settlements.can_apply(settlement, legal).await? {
                    return Err(ApplicationError::Rejected(format!(
                        "Couldn't apply to join {s} as {} has already applied or been invited, or {s} is not currently accepting new applicants.",
                        c.name,
                        s = target.name
                    )));
                }
                if let Eligibility::Denied(reason) = self.can_join(company, settlement).await? {
                    return Err(ApplicationError::Rejected(reason));
                }

                let Some(approver) = target.approver else {
                    self.ports.settlements.admit(settlement, legal, true).await?;
                    info!(company = %company, settlement = %settlement, "Company admitted to settlement");
                    return Ok(Outcome::new(format!("{} has joined {}", c.name, target.name)));
                };
                self.ports.settlements.add_applicant(settlement, legal).await?;
                self.messenger
                    .company(
                        &c,
                        Notice::government(format!(
                            "{} has applied to join {}.",
                            c.name, target.name
                        )),
                    )
                    .await;
                self.messenger
                    .mail(
                        approver,
                        Notice::notification(format!(
                            "{} has applied to be a Citizen of {s}. You may approve or reject this application on {s}.",
                            c.name,
                            s = target.name
                        )),
                    )
                    .await;
                info!(company = %company, settlement = %settlement, "Company applied to settlement");
                Ok(Outcome::new(format!("{} has applied to join {}", c.name, target.name)))
            })
            .await
    }

    /// Accept an invitation of `settlement`, or join directly when it has no approver
    #[instrument(skip(self))]
    pub async fn join_settlement(
        &self,
        company: CompanyId,
        invoker: MemberId,
        settlement: SettlementId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let target = self
                    .ports
                    .settlements
                    .get(settlement)
                    .await?
                    .ok_or_else(|| ApplicationError::not_found("Settlement", settlement))?;
                Self::ensure_leader(&c, invoker, format!("try to join {}", target.name))?;
                if let Eligibility::Denied(reason) = self.can_join(company, settlement).await? {
                    return Err(ApplicationError::Rejected(reason));
                }
                let legal = c.legal_identity();
                let employer_driven = target.approver.is_none();
                if !employer_driven
                    && !self
                        .ports
                        .settlements
                        .can_accept_invitation(settlement, legal)
                        .await?
                {
                    return Err(ApplicationError::Rejected(format!(
                        "Couldn't try to join {} as {} has not been invited.",
                        target.name, c.name
                    )));
                }
                self.ports
                    .settlements
                    .admit(settlement, legal, employer_driven)
                    .await?;
                info!(company = %company, settlement = %settlement, "Company joined settlement");
                Ok(Outcome::new(format!("{} has joined {}", c.name, target.name)))
            })
            .await
    }

    /// Give up the company's citizenship
    #[instrument(skip(self))]
    pub async fn leave_settlement(
        &self,
        company: CompanyId,
        invoker: MemberId,
    ) -> Result<Outcome, ApplicationError> {
        self.locks
            .exclusive(company, async {
                let c = self.company(company).await?;
                let legal = self.legal_member(&c).await?;
                let Some(current) = legal.citizenship else {
                    return Err(ApplicationError::Rejected(format!(
                        "{} is not currently part of any settlement.",
                        c.name
                    )));
                };
                let name = self.settlement_name(current).await;
                Self::ensure_leader(&c, invoker, format!("leave {name} from {}", c.name))?;
                if !self.ports.settlements.can_leave(current, legal.id).await? {
                    return Err(ApplicationError::Rejected(format!(
                        "Couldn't leave {name} as {} is not currently a citizen.",
                        c.name
                    )));
                }
                if let Eligibility::Denied(reason) = self.can_leave(company).await? {
                    return Err(ApplicationError::Rejected(reason));
                }
                self.ports.settlements.force_remove(current, legal.id).await?;
                info!(company = %company, settlement = %current, "Company left settlement");
                Ok(Outcome::new(format!("{} has left {name}", c.name)))
            })
            .await
    }
}
