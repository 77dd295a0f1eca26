//! Property store port
//!
//! Access to the world's property index. Ownership transfers go through
//! [`PropertyStorePort::transfer`] so that the world can announce them on
//! its change feed.

use async_trait::async_trait;
use domain::{MemberId, OwnerChangeKind, Property, PropertyId, SettlementId, WorldPosition};

use crate::error::ApplicationError;

#[async_trait]
pub trait PropertyStorePort: Send + Sync {
    async fn get(&self, id: PropertyId) -> Result<Option<Property>, ApplicationError>;

    /// All properties whose owner of record is `owner`, ordered by ID
    async fn owned_by(&self, owner: MemberId) -> Result<Vec<Property>, ApplicationError>;

    /// Property that claims the plot at `position`, if any
    async fn at_position(
        &self,
        position: WorldPosition,
    ) -> Result<Option<Property>, ApplicationError>;

    /// Store changed fields and mark the property dirty
    ///
    /// Ownership is not changed by this call.
    async fn update(&self, property: &Property) -> Result<(), ApplicationError>;

    /// Hand the property to `new_owner`, announcing the change
    ///
    /// Returns once every change listener has been notified.
    async fn transfer(
        &self,
        id: PropertyId,
        new_owner: Option<MemberId>,
        kind: OwnerChangeKind,
    ) -> Result<(), ApplicationError>;

    /// Rename the property to a unique name based on `desired`
    async fn rename(&self, id: PropertyId, desired: &str) -> Result<String, ApplicationError>;

    /// Run the rent editor on behalf of `editor`, who must own the property
    async fn open_rent_editor(
        &self,
        id: PropertyId,
        editor: MemberId,
    ) -> Result<(), ApplicationError>;

    /// Recompute which settlement influences the property
    async fn refresh_settlement_influence(
        &self,
        id: PropertyId,
    ) -> Result<Option<SettlementId>, ApplicationError>;
}
