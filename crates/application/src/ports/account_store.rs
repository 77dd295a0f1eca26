//! Account store port

use async_trait::async_trait;
use domain::{Account, AccountId, MemberId};

use crate::error::ApplicationError;

#[async_trait]
pub trait AccountStorePort: Send + Sync {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, ApplicationError>;

    /// Accounts whose manager set contains `manager`
    async fn managed_by(&self, manager: MemberId) -> Result<Vec<Account>, ApplicationError>;

    /// Store the account's permission lists and name
    async fn update(&self, account: &Account) -> Result<(), ApplicationError>;
}
