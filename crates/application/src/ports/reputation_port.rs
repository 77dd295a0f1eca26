//! Reputation port
//!
//! The scoring itself belongs to the reputation system. The company core
//! only reads figures and adjusts relationships.

use async_trait::async_trait;
use domain::{MemberId, ReputationSample, ReputationSource};

use crate::error::ApplicationError;

#[async_trait]
pub trait ReputationPort: Send + Sync {
    /// Current figures of `member`
    async fn sample(&self, member: MemberId) -> Result<ReputationSample, ApplicationError>;

    /// Net reputation `giver` has given `receiver` in total
    async fn given_total(&self, giver: MemberId, receiver: MemberId)
    -> Result<f64, ApplicationError>;

    /// Reputation `giver` has given `receiver` today
    async fn given_today(&self, giver: MemberId, receiver: MemberId)
    -> Result<f64, ApplicationError>;

    /// Shift the relationship from `source` toward `target` by `delta`
    async fn adjust(
        &self,
        target: MemberId,
        source: ReputationSource,
        delta: f64,
    ) -> Result<(), ApplicationError>;

    /// Every non-zero relationship contributing to `target`
    async fn contributions(
        &self,
        target: MemberId,
    ) -> Result<Vec<(ReputationSource, f64)>, ApplicationError>;

    /// Restore `giver`'s daily reputation allowance
    async fn replenish(&self, giver: MemberId) -> Result<(), ApplicationError>;
}
