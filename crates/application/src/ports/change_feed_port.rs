//! Change feed port
//!
//! Attribute-change notifications from the world. The world delivers each
//! event to its listeners before the call that caused it returns.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{MemberId, PropertyId, SettlementId};
use uuid::Uuid;

use crate::error::ApplicationError;

/// What a subscription is interested in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchTarget {
    /// Owner changes of one property
    PropertyOwner(PropertyId),
    /// Citizenship changes of one member
    Citizenship(MemberId),
    /// Every property that gains a new owner
    Acquisitions,
}

/// A single attribute change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    OwnerChanged {
        property: PropertyId,
        before: Option<MemberId>,
        after: Option<MemberId>,
    },
    CitizenshipChanged {
        member: MemberId,
        before: Option<SettlementId>,
        after: Option<SettlementId>,
    },
    PropertyAcquired {
        property: PropertyId,
        new_owner: MemberId,
    },
}

/// Handle returned by [`ChangeFeedPort::watch`], used to release the subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(Uuid);

impl WatchHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WatchHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver of change events
#[async_trait]
pub trait ChangeListener: Send + Sync {
    async fn on_change(&self, event: ChangeEvent);
}

#[async_trait]
pub trait ChangeFeedPort: Send + Sync {
    /// Subscribe `listener` to changes of `target`
    async fn watch(
        &self,
        target: WatchTarget,
        listener: Arc<dyn ChangeListener>,
    ) -> Result<WatchHandle, ApplicationError>;

    /// Release a subscription; unknown handles are ignored
    async fn unwatch(&self, handle: WatchHandle) -> Result<(), ApplicationError>;
}
