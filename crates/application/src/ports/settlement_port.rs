//! Settlement port
//!
//! Settlement rosters and the eligibility hooks of their immigration
//! policies. Roster changes update the member's recorded citizenship and
//! notify its watchers.

use async_trait::async_trait;
use domain::{Eligibility, MemberId, Settlement, SettlementId};

use crate::error::ApplicationError;

#[async_trait]
pub trait SettlementPort: Send + Sync {
    async fn get(&self, id: SettlementId) -> Result<Option<Settlement>, ApplicationError>;

    async fn all(&self) -> Result<Vec<Settlement>, ApplicationError>;

    /// Whether `member` is on the settlement's direct citizen roster
    async fn has_citizen(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError>;

    /// Add `member` to the roster
    ///
    /// `employer_driven` admissions do not count toward immigration limits.
    async fn admit(
        &self,
        settlement: SettlementId,
        member: MemberId,
        employer_driven: bool,
    ) -> Result<(), ApplicationError>;

    /// Take `member` off the roster as a regular departure
    async fn release(
        &self,
        settlement: SettlementId,
        member: MemberId,
        employer_driven: bool,
    ) -> Result<(), ApplicationError>;

    /// Take `member` off the roster bypassing every departure rule
    async fn force_remove(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<(), ApplicationError>;

    /// Whether the roster currently takes an application from `member`
    async fn can_apply(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError>;

    async fn add_applicant(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<(), ApplicationError>;

    /// Whether `member` holds a standing invitation
    async fn can_accept_invitation(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError>;

    /// Whether `member` is currently a citizen who may leave
    async fn can_leave(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<bool, ApplicationError>;

    /// Immigration policy check for joining as a direct citizen
    async fn check_immigration(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<Eligibility, ApplicationError>;

    /// Low-level roster membership hook
    async fn check_roster_eligibility(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<Eligibility, ApplicationError>;

    /// Whether `member` may leave while owning property inside the settlement
    async fn check_leave_with_properties(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<Eligibility, ApplicationError>;

    /// Internal restriction on members with a homestead leaving
    async fn check_homestead_leave(
        &self,
        settlement: SettlementId,
        member: MemberId,
    ) -> Result<Eligibility, ApplicationError>;

    /// The top-level settlement enclosing `settlement` and all of its descendants
    async fn family(&self, settlement: SettlementId)
    -> Result<Vec<SettlementId>, ApplicationError>;
}
