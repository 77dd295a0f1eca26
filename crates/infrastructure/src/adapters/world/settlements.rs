use application::{ApplicationError, ports::SettlementPort};
use async_trait::async_trait;
use domain::{Eligibility, MemberId, Settlement, SettlementId};
use tracing::debug;

use super::{InMemoryWorld, RosterChange, SettlementRecord, WorldState};

/// Policy answers a settlement gives to the eligibility hooks
///
/// A `Some` reason denies the corresponding check.
#[derive(Debug, Clone)]
pub struct SettlementRules {
    pub accepting_applicants: bool,
    pub immigration_denial: Option<String>,
    pub roster_denial: Option<String>,
    pub property_leave_denial: Option<String>,
    pub homestead_leave_denial: Option<String>,
}

impl Default for SettlementRules {
    fn default() -> Self {
        Self {
            accepting_applicants: true,
            immigration_denial: None,
            roster_denial: None,
            property_leave_denial: None,
            homestead_leave_denial: None,
        }
    }
}

fn eligibility(denial: Option<&str>) -> Eligibility {
    denial.map_or(Eligibility::Allowed, Eligibility::denied)
}

impl WorldState {
    fn settlement(&self, id: SettlementId) -> Result<&SettlementRecord, ApplicationError> {
        self.settlements
            .get(&id)
            .ok_or_else(|| ApplicationError::not_found("Settlement", id))
    }

    fn settlement_mut(
        &mut self,
        id: SettlementId,
    ) -> Result<&mut SettlementRecord, ApplicationError> {
        self.settlements
            .get_mut(&id)
            .ok_or_else(|| ApplicationError::not_found("Settlement", id))
    }

    /// Take `member` off `settlement`'s roster; returns the citizenship before and after
    fn leave_roster(
        &mut self,
        settlement: SettlementId,
        member: MemberId,
        employer_driven: bool,
        forced: bool,
    ) -> Result<(Option<SettlementId>, Option<SettlementId>), ApplicationError> {
        let removed = self.settlement_mut(settlement)?.citizens.remove(&member);
        if removed {
            self.roster_log.push(RosterChange {
                settlement,
                member,
                joined: false,
                employer_driven,
                forced,
            });
        }
        let citizen = self
            .members
            .get_mut(&member)
            .ok_or_else(|| ApplicationError::not_found("Member", member))?;
        let before = citizen.citizenship;
        if before == Some(settlement) {
            citizen.citizenship = None;
        }
        Ok((before, citizen.citizenship))
    }
}

#[async_trait]
impl SettlementPort for InMemoryWorld {
    async fn get(&self, id: SettlementId) -> Result<Option<Settlement>, ApplicationError> {
        Ok(self
            .state
            .read()
            .settlements
            .get(&id)
            .map(|r| r.settlement.clone()))
    }

    async fn all(&self) -> Result<Vec<Settlement>, ApplicationError> {
        Ok(self
            .state
            .read()
            .settlements
            .values()
            .map(|r| r.settlement.clone())
            .collect())
    }

    async fn has_citizen(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError> {
        Ok(self
            .state
            .read()
            .settlement(settlement)?
            .citizens
            .contains(&member))
    }

    async fn admit(
        &self,
        settlement: SettlementId,
        member: MemberId,
        employer_driven: bool,
    ) -> Result<(), ApplicationError> {
        let (before, after) = {
            let mut state = self.state.write();
            let record = state.settlement_mut(settlement)?;
            record.applicants.remove(&member);
            record.invitations.remove(&member);
            let joined = record.citizens.insert(member);
            if joined {
                state.roster_log.push(RosterChange {
                    settlement,
                    member,
                    joined: true,
                    employer_driven,
                    forced: false,
                });
            }
            let previous = state
                .members
                .get(&member)
                .ok_or_else(|| ApplicationError::not_found("Member", member))?
                .citizenship;
            if let Some(previous) = previous.filter(|p| *p != settlement) {
                state.leave_roster(previous, member, employer_driven, false)?;
            }
            if let Some(citizen) = state.members.get_mut(&member) {
                citizen.citizenship = Some(settlement);
            }
            (previous, Some(settlement))
        };
        debug!(settlement = %settlement, member = %member, employer_driven, "Admitted");
        self.publish_citizenship(member, before, after).await;
        Ok(())
    }

    async fn release(
        &self,
        settlement: SettlementId,
        member: MemberId,
        employer_driven: bool,
    ) -> Result<(), ApplicationError> {
        let (before, after) =
            self.state
                .write()
                .leave_roster(settlement, member, employer_driven, false)?;
        debug!(settlement = %settlement, member = %member, employer_driven, "Released");
        self.publish_citizenship(member, before, after).await;
        Ok(())
    }

    async fn force_remove(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<(), ApplicationError> {
        let (before, after) = self
            .state
            .write()
            .leave_roster(settlement, member, false, true)?;
        debug!(settlement = %settlement, member = %member, "Force removed");
        self.publish_citizenship(member, before, after).await;
        Ok(())
    }

    async fn can_apply(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError> {
        let state = self.state.read();
        let record = state.settlement(settlement)?;
        Ok(record.rules.accepting_applicants
            && !record.applicants.contains(&member)
            && !record.invitations.contains(&member)
            && !record.citizens.contains(&member))
    }

    async fn add_applicant(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<(), ApplicationError> {
        self.state
            .write()
            .settlement_mut(settlement)?
            .applicants
            .insert(member);
        Ok(())
    }

    async fn can_accept_invitation(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError> {
        Ok(self
            .state
            .read()
            .settlement(settlement)?
            .invitations
            .contains(&member))
    }

    async fn can_leave(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError> {
        self.has_citizen(settlement, member).await
    }

    async fn check_immigration(
        &self,
        settlement: SettlementId,
        _member: MemberId,
    ) -> Result<Eligibility, ApplicationError> {
        let state = self.state.read();
        Ok(eligibility(
            state.settlement(settlement)?.rules.immigration_denial.as_deref(),
        ))
    }

    async fn check_roster_eligibility(
        &self,
        settlement: SettlementId,
        _member: MemberId,
    ) -> Result<Eligibility, ApplicationError> {
        let state = self.state.read();
        Ok(eligibility(
            state.settlement(settlement)?.rules.roster_denial.as_deref(),
        ))
    }

    async fn check_leave_with_properties(
        &self,
        settlement: SettlementId,
        _member: MemberId,
    ) -> Result<Eligibility, ApplicationError> {
        let state = self.state.read();
        Ok(eligibility(
            state.settlement(settlement)?.rules.property_leave_denial.as_deref(),
        ))
    }

    async fn check_homestead_leave(
        &self,
        settlement: SettlementId,
        _member: MemberId,
    ) -> Result<Eligibility, ApplicationError> {
        let state = self.state.read();
        Ok(eligibility(
            state.settlement(settlement)?.rules.homestead_leave_denial.as_deref(),
        ))
    }

    async fn family(
        &self,
        settlement: SettlementId,
    ) -> Result<Vec<SettlementId>, ApplicationError> {
        let state = self.state.read();
        state.settlement(settlement)?;
        let mut family = vec![settlement];
        let mut next = 0;
        while next < family.len() {
            let parent = family[next];
            let children: Vec<SettlementId> = state
                .settlements
                .values()
                .filter(|r| r.settlement.parent == Some(parent))
                .map(|r| r.settlement.id)
                .filter(|id| !family.contains(id))
                .collect();
            family.extend(children);
            next += 1;
        }
        Ok(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn admit_moves_between_rosters() {
        let world = InMemoryWorld::new();
        let member = world.add_member("Ann");
        let first = world.add_settlement(Settlement::new("First"));
        let second = world.add_settlement(Settlement::new("Second"));

        world.admit(first, member, false).await.unwrap();
        world.admit(second, member, true).await.unwrap();

        assert!(world.citizens_of(first).is_empty());
        assert_eq!(world.citizens_of(second), vec![member]);
        assert_eq!(world.member_record(member).unwrap().citizenship, Some(second));
        let log = world.roster_log();
        assert_eq!(log.len(), 3);
        assert!(log[1].employer_driven && log[1].joined);
        assert!(!log[2].joined);
    }

    #[tokio::test]
    async fn release_clears_recorded_citizenship() {
        let world = InMemoryWorld::new();
        let member = world.add_member("Ann");
        let town = world.add_settlement(Settlement::new("Town"));
        world.admit(town, member, false).await.unwrap();

        world.release(town, member, true).await.unwrap();

        assert!(!world.has_citizen(town, member).await.unwrap());
        assert_eq!(world.member_record(member).unwrap().citizenship, None);
    }

    #[tokio::test]
    async fn rules_drive_eligibility() {
        let world = InMemoryWorld::new();
        let member = world.add_member("Ann");
        let town = world.add_settlement(Settlement::new("Town"));
        world.set_settlement_rules(
            town,
            SettlementRules {
                accepting_applicants: false,
                immigration_denial: Some("the borders are closed".into()),
                ..SettlementRules::default()
            },
        );

        assert!(!world.can_apply(town, member).await.unwrap());
        assert_eq!(
            world.check_immigration(town, member).await.unwrap(),
            Eligibility::denied("the borders are closed")
        );
        assert!(world.check_roster_eligibility(town, member).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn family_includes_nested_descendants() {
        let world = InMemoryWorld::new();
        let nation = Settlement::new("Nation");
        let nation_id = nation.id;
        world.add_settlement(nation);
        let city = Settlement::new("City").with_parent(nation_id);
        let city_id = city.id;
        world.add_settlement(city);
        let district_id = world.add_settlement(Settlement::new("District").with_parent(city_id));
        world.add_settlement(Settlement::new("Elsewhere"));

        let family = world.family(nation_id).await.unwrap();
        assert_eq!(family.len(), 3);
        assert!(family.contains(&city_id));
        assert!(family.contains(&district_id));
    }
}
