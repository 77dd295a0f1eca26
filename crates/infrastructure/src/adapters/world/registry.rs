use application::{ApplicationError, ports::CompanyRegistryPort};
use async_trait::async_trait;
use domain::{Company, CompanyId};
use tracing::debug;

use super::InMemoryWorld;

#[async_trait]
impl CompanyRegistryPort for InMemoryWorld {
    async fn get(&self, id: CompanyId) -> Result<Option<Company>, ApplicationError> {
        Ok(self.state.read().companies.get(&id).cloned())
    }

    async fn save(&self, company: &Company) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        state.companies.insert(company.id, company.clone());
        state.dirty_companies.insert(company.id);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Company>, ApplicationError> {
        Ok(self.state.read().companies.values().cloned().collect())
    }

    async fn remove(&self, id: CompanyId) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        if state.companies.remove(&id).is_some() {
            debug!(company = %id, "Company deregistered");
        }
        state.dirty_companies.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::{AccountId, CompanyAssets, CurrencyId, MemberId};

    use super::*;

    fn company(name: &str) -> Company {
        Company::found(
            name,
            MemberId::new(),
            CompanyAssets {
                legal_identity: MemberId::new(),
                treasury: AccountId::new(),
                share_currency: CurrencyId::new(),
            },
        )
    }

    #[tokio::test]
    async fn save_marks_dirty_and_replaces() {
        let world = InMemoryWorld::new();
        let mut acme = company("Acme");
        world.save(&acme).await.unwrap();
        acme.name = "Acme Two".into();
        world.save(&acme).await.unwrap();

        assert_eq!(world.all().await.unwrap().len(), 1);
        assert_eq!(world.company_record(acme.id).unwrap().name, "Acme Two");
        assert_eq!(world.take_dirty_companies(), vec![acme.id]);
        assert!(world.take_dirty_companies().is_empty());
    }

    #[tokio::test]
    async fn remove_deregisters() {
        let world = InMemoryWorld::new();
        let acme = company("Acme");
        world.save(&acme).await.unwrap();
        world.remove(acme.id).await.unwrap();
        assert!(CompanyRegistryPort::get(&world, acme.id).await.unwrap().is_none());
    }
}
