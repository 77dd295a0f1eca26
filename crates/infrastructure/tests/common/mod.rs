//! Shared fixture: one company founded in a fresh in-memory world

#![allow(dead_code)]

use application::{CompanyPolicy, CompanyService, ports::PropertyStorePort};
use domain::{
    Company, CompanyId, MemberId, OwnerChangeKind, PlotSizing, Property, PropertyId, PropertyKind,
};
use infrastructure::{CompanyRuntime, InMemoryWorld, ValidatingActionPipeline};

pub struct Fixture {
    pub runtime: CompanyRuntime,
    pub leader: MemberId,
    pub id: CompanyId,
    pub legal: MemberId,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_policy(CompanyPolicy::default()).await
    }

    pub async fn with_policy(policy: CompanyPolicy) -> Self {
        Self::found_in(CompanyRuntime::in_memory(policy), "Acme").await
    }

    /// Start `runtime`'s service and found `name` in it
    pub async fn found_in(runtime: CompanyRuntime, name: &str) -> Self {
        runtime.service.start().await.unwrap();
        let leader = runtime.world.add_member("Leader");
        let company = runtime.service.found_company(leader, name).await.unwrap();
        Self {
            legal: company.legal_identity(),
            id: company.id,
            leader,
            runtime,
        }
    }

    pub fn world(&self) -> &InMemoryWorld {
        &self.runtime.world
    }

    pub fn service(&self) -> &CompanyService {
        &self.runtime.service
    }

    pub fn pipeline(&self) -> &ValidatingActionPipeline {
        &self.runtime.pipeline
    }

    /// Current record of the company
    pub fn company(&self) -> Company {
        self.world().company_record(self.id).unwrap()
    }

    /// Add a player and hire them through invite and join
    pub async fn hire(&self, name: &str) -> MemberId {
        let member = self.world().add_member(name);
        self.service()
            .invite(self.id, self.leader, member)
            .await
            .unwrap();
        self.service().join(self.id, member).await.unwrap();
        member
    }

    /// An unowned homestead with a ten plot base allowance
    pub fn homestead(&self, name: &str) -> PropertyId {
        self.world().add_property(
            Property::new(name, PropertyKind::Homestead, None).with_plots(PlotSizing::new(0, 10)),
        )
    }

    /// Hand `property` to `owner` through the observed path
    pub async fn transfer(&self, property: PropertyId, owner: Option<MemberId>) {
        PropertyStorePort::transfer(self.world(), property, owner, OwnerChangeKind::Normal)
            .await
            .unwrap();
    }

    /// Give the company a fresh homestead, which becomes its headquarters
    pub async fn give_headquarters(&self) -> PropertyId {
        let hq = self.homestead("Cottage");
        self.transfer(hq, Some(self.legal)).await;
        hq
    }

    pub fn property(&self, id: PropertyId) -> Property {
        self.world().property_record(id).unwrap()
    }
}
