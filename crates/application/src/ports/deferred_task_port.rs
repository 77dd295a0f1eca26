//! Deferred task port
//!
//! Delayed work tied to a company's lifetime. Scheduling a task under a key
//! that is still pending replaces the pending one, which restarts its delay.

use std::time::Duration;

use domain::{AccountId, CompanyId};
use futures::future::BoxFuture;

/// Kind of delayed work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Reputation averaging after the settle delay
    ReputationRefresh,
    /// Coalesced wealth change of one employee account
    WealthChange(AccountId),
}

/// Identity of a deferred task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub company: CompanyId,
    pub kind: TaskKind,
}

impl TaskKey {
    pub const fn new(company: CompanyId, kind: TaskKind) -> Self {
        Self { company, kind }
    }
}

pub trait DeferredTaskPort: Send + Sync {
    /// Run `task` after `delay`, replacing any pending task with the same key
    fn schedule(&self, key: TaskKey, delay: Duration, task: BoxFuture<'static, ()>);

    /// Cancel every pending task of `company`; returns how many were cancelled
    fn cancel_company(&self, company: CompanyId) -> usize;
}
