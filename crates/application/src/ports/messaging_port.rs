//! Messaging port - chat, mail and global announcements

use async_trait::async_trait;
use domain::{MemberId, Notice};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Show a notice to one member
    async fn notify(&self, member: MemberId, notice: Notice) -> Result<(), ApplicationError>;

    /// Deliver a notice to a member's mailbox
    async fn mail(&self, member: MemberId, notice: Notice) -> Result<(), ApplicationError>;

    /// Show a notice to everyone
    async fn broadcast(&self, notice: Notice) -> Result<(), ApplicationError>;
}
