use application::{
    ApplicationError,
    ports::{DisplayScope, DisplayStatePort, MessagingPort},
};
use async_trait::async_trait;
use domain::{MemberId, Notice};
use tracing::debug;

use super::{InMemoryWorld, NoticeChannel, SentNotice};

impl InMemoryWorld {
    fn deliver(&self, channel: NoticeChannel, notice: Notice) {
        debug!(?channel, category = ?notice.category, text = %notice.text, "Notice delivered");
        self.state.write().notices.push(SentNotice { channel, notice });
    }
}

#[async_trait]
impl MessagingPort for InMemoryWorld {
    async fn notify(&self, member: MemberId, notice: Notice) -> Result<(), ApplicationError> {
        self.deliver(NoticeChannel::Member(member), notice);
        Ok(())
    }

    async fn mail(&self, member: MemberId, notice: Notice) -> Result<(), ApplicationError> {
        self.deliver(NoticeChannel::Mailbox(member), notice);
        Ok(())
    }

    async fn broadcast(&self, notice: Notice) -> Result<(), ApplicationError> {
        self.deliver(NoticeChannel::Everyone, notice);
        Ok(())
    }
}

#[async_trait]
impl DisplayStatePort for InMemoryWorld {
    async fn invalidate(&self, scope: DisplayScope) {
        self.state.write().invalidations.push(scope);
    }
}
