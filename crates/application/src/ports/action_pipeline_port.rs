//! Action pipeline port
//!
//! World-changing transitions are submitted here before they are applied.
//! Every validator registered in the world sees the pack and may refuse it.

use async_trait::async_trait;
use domain::{ActionPack, ActionVerdict};

use crate::error::ApplicationError;

/// Port for validating and committing action packs
///
/// Callers apply their own post-commit effects exactly once, and only after
/// an [`ActionVerdict::Accepted`] verdict. A rejection carries the reason
/// the player should see.
#[async_trait]
pub trait ActionPipelinePort: Send + Sync {
    /// Run all validators over the pack and commit it if none object
    async fn perform(&self, pack: ActionPack) -> Result<ActionVerdict, ApplicationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn ActionPipelinePort>();
    }
}
