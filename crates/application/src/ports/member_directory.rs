//! Member directory port

use async_trait::async_trait;
use domain::{Member, MemberId, SettlementId};

use crate::error::ApplicationError;

#[async_trait]
pub trait MemberDirectoryPort: Send + Sync {
    async fn get(&self, id: MemberId) -> Result<Option<Member>, ApplicationError>;

    /// Store the member's homestead, presence and activity fields
    ///
    /// Citizenship is left untouched; use [`MemberDirectoryPort::set_citizenship`].
    async fn update(&self, member: &Member) -> Result<(), ApplicationError>;

    /// Overwrite the recorded citizenship without touching any roster
    ///
    /// Watchers of the member's citizenship are notified when it changes.
    async fn set_citizenship(
        &self,
        id: MemberId,
        citizenship: Option<SettlementId>,
    ) -> Result<(), ApplicationError>;
}
