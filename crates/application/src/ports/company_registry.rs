//! Company registry port
//!
//! The registrar of every company in the world. Saving a company is also
//! the signal that it must be persisted.

use async_trait::async_trait;
use domain::{Company, CompanyId};

use crate::error::ApplicationError;

#[async_trait]
pub trait CompanyRegistryPort: Send + Sync {
    /// Get a company by ID
    async fn get(&self, id: CompanyId) -> Result<Option<Company>, ApplicationError>;

    /// Insert or replace a company and mark it dirty
    async fn save(&self, company: &Company) -> Result<(), ApplicationError>;

    /// Every registered company
    async fn all(&self) -> Result<Vec<Company>, ApplicationError>;

    /// Deregister a company
    async fn remove(&self, id: CompanyId) -> Result<(), ApplicationError>;
}
