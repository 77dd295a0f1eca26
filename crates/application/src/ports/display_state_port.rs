//! Display state port
//!
//! Rendered views of a company are cached by the presentation layer. The
//! core only says which views went stale.

use async_trait::async_trait;
use domain::{CompanyId, MemberId};

/// A cached view that needs re-rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayScope {
    /// The shared company view
    Company(CompanyId),
    /// The per-member view of a company
    MemberView { company: CompanyId, member: MemberId },
}

#[async_trait]
pub trait DisplayStatePort: Send + Sync {
    async fn invalidate(&self, scope: DisplayScope);
}
