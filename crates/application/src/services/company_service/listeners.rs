//! Change-feed listeners handed to the world

use std::sync::Weak;

use async_trait::async_trait;
use domain::CompanyId;
use tracing::debug;

use super::CompanyService;
use crate::ports::{ChangeEvent, ChangeListener};

/// Forwards the changes of one company's subscriptions
#[derive(Debug)]
pub(super) struct CompanyChangeListener {
    company: CompanyId,
    service: Weak<CompanyService>,
}

impl CompanyChangeListener {
    pub(super) const fn new(company: CompanyId, service: Weak<CompanyService>) -> Self {
        Self { company, service }
    }
}

#[async_trait]
impl ChangeListener for CompanyChangeListener {
    async fn on_change(&self, event: ChangeEvent) {
        match self.service.upgrade() {
            Some(service) => service.handle_change(self.company, event).await,
            None => debug!(company = %self.company, "Change after service shutdown ignored"),
        }
    }
}

/// Forwards every property acquisition in the world
#[derive(Debug)]
pub(super) struct AcquisitionListener {
    service: Weak<CompanyService>,
}

impl AcquisitionListener {
    pub(super) const fn new(service: Weak<CompanyService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ChangeListener for AcquisitionListener {
    async fn on_change(&self, event: ChangeEvent) {
        if let (Some(service), ChangeEvent::PropertyAcquired { property, new_owner }) =
            (self.service.upgrade(), event)
        {
            service.on_property_acquired(property, new_owner).await;
        }
    }
}
