use std::sync::Arc;

use application::{
    ApplicationError,
    ports::{ChangeFeedPort, ChangeListener, WatchHandle, WatchTarget},
};
use async_trait::async_trait;
use tracing::debug;

use super::{InMemoryWorld, Subscription};

#[async_trait]
impl ChangeFeedPort for InMemoryWorld {
    async fn watch(
        &self,
        target: WatchTarget,
        listener: Arc<dyn ChangeListener>,
    ) -> Result<WatchHandle, ApplicationError> {
        let handle = WatchHandle::new();
        self.subscriptions.write().push(Subscription {
            handle,
            target,
            listener,
        });
        debug!(?target, ?handle, "Subscription added");
        Ok(handle)
    }

    async fn unwatch(&self, handle: WatchHandle) -> Result<(), ApplicationError> {
        self.subscriptions.write().retain(|s| s.handle != handle);
        Ok(())
    }
}
