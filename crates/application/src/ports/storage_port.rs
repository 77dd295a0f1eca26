//! Shared storage port

use async_trait::async_trait;
use domain::{MemberId, SharedStorage, StorageId};

use crate::error::ApplicationError;

#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn get(&self, id: StorageId) -> Result<Option<SharedStorage>, ApplicationError>;

    /// Storages `member` can access
    async fn accessible_by(&self, member: MemberId)
    -> Result<Vec<SharedStorage>, ApplicationError>;

    /// Add `members` to the storage's access list, skipping those already on it
    async fn grant(
        &self,
        storage: StorageId,
        members: Vec<MemberId>,
    ) -> Result<(), ApplicationError>;
}
