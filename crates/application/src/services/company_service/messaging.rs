//! Company-scoped messaging
//!
//! Delivery failures are logged and never interrupt the caller.

use std::{fmt, sync::Arc};

use domain::{Company, MemberId, Notice};
use tracing::warn;

use crate::ports::MessagingPort;

pub(crate) struct CompanyMessenger {
    messaging: Arc<dyn MessagingPort>,
}

impl fmt::Debug for CompanyMessenger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompanyMessenger").finish_non_exhaustive()
    }
}

impl CompanyMessenger {
    pub(crate) fn new(messaging: Arc<dyn MessagingPort>) -> Self {
        Self { messaging }
    }

    /// Send to every current employee of `company`
    pub(crate) async fn company(&self, company: &Company, notice: Notice) {
        for member in company.all_employees() {
            if let Err(e) = self.messaging.notify(member, notice.clone()).await {
                warn!(company = %company.id, member = %member, error = %e, "Failed to deliver company notice");
            }
        }
    }

    pub(crate) async fn mail(&self, member: MemberId, notice: Notice) {
        if let Err(e) = self.messaging.mail(member, notice).await {
            warn!(member = %member, error = %e, "Failed to deliver mail");
        }
    }

    pub(crate) async fn global(&self, notice: Notice) {
        if let Err(e) = self.messaging.broadcast(notice).await {
            warn!(error = %e, "Failed to broadcast notice");
        }
    }
}
