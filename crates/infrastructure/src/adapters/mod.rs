//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod action_pipeline;
mod deferred_tasks;
mod world;

pub use action_pipeline::{ActionValidator, PerformedPack, ValidatingActionPipeline};
pub use deferred_tasks::TokioDeferredTasks;
pub use world::{
    InMemoryWorld, NoticeChannel, OwnerTransfer, RosterChange, SentNotice, SettlementRules,
};
