//! Port definitions for application layer
//!
//! Ports are interfaces that define how the company core interacts with
//! the surrounding world. Adapters in the infrastructure layer implement
//! these ports.

mod account_store;
mod action_pipeline_port;
mod change_feed_port;
mod company_registry;
mod deferred_task_port;
mod display_state_port;
mod member_directory;
mod messaging_port;
mod property_store;
mod provisioning_port;
mod reputation_port;
mod settlement_port;
mod storage_port;
mod world_clock_port;

use std::{fmt, sync::Arc};

pub use account_store::AccountStorePort;
pub use action_pipeline_port::ActionPipelinePort;
pub use change_feed_port::{ChangeEvent, ChangeFeedPort, ChangeListener, WatchHandle, WatchTarget};
pub use company_registry::CompanyRegistryPort;
pub use deferred_task_port::{DeferredTaskPort, TaskKey, TaskKind};
pub use display_state_port::{DisplayScope, DisplayStatePort};
pub use member_directory::MemberDirectoryPort;
#[cfg(test)]
pub use messaging_port::MockMessagingPort;
pub use messaging_port::MessagingPort;
pub use property_store::PropertyStorePort;
pub use provisioning_port::ProvisioningPort;
pub use reputation_port::ReputationPort;
pub use settlement_port::SettlementPort;
pub use storage_port::StoragePort;
pub use world_clock_port::WorldClockPort;

/// Every collaborator the company service talks to
#[derive(Clone)]
pub struct CompanyPorts {
    pub registry: Arc<dyn CompanyRegistryPort>,
    pub pipeline: Arc<dyn ActionPipelinePort>,
    pub properties: Arc<dyn PropertyStorePort>,
    pub accounts: Arc<dyn AccountStorePort>,
    pub members: Arc<dyn MemberDirectoryPort>,
    pub settlements: Arc<dyn SettlementPort>,
    pub reputation: Arc<dyn ReputationPort>,
    pub messaging: Arc<dyn MessagingPort>,
    pub display: Arc<dyn DisplayStatePort>,
    pub feed: Arc<dyn ChangeFeedPort>,
    pub deferred: Arc<dyn DeferredTaskPort>,
    pub provisioning: Arc<dyn ProvisioningPort>,
    pub clock: Arc<dyn WorldClockPort>,
    pub storages: Arc<dyn StoragePort>,
}

impl fmt::Debug for CompanyPorts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanyPorts").finish_non_exhaustive()
    }
}
