use application::{
    ApplicationError,
    ports::{AccountStorePort, StoragePort},
};
use async_trait::async_trait;
use domain::{Account, AccountId, MemberId, SharedStorage, StorageId};
use tracing::debug;

use super::InMemoryWorld;

#[async_trait]
impl AccountStorePort for InMemoryWorld {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, ApplicationError> {
        Ok(self.state.read().accounts.get(&id).cloned())
    }

    async fn managed_by(&self, manager: MemberId) -> Result<Vec<Account>, ApplicationError> {
        let mut accounts: Vec<Account> = self
            .state
            .read()
            .accounts
            .values()
            .filter(|a| a.is_managed_by(manager))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    async fn update(&self, account: &Account) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        let stored = state
            .accounts
            .get_mut(&account.id)
            .ok_or_else(|| ApplicationError::not_found("Account", account.id))?;
        stored.name.clone_from(&account.name);
        stored.managers.clone_from(&account.managers);
        stored.users.clone_from(&account.users);
        Ok(())
    }
}

#[async_trait]
impl StoragePort for InMemoryWorld {
    async fn get(&self, id: StorageId) -> Result<Option<SharedStorage>, ApplicationError> {
        Ok(self.state.read().storages.get(&id).cloned())
    }

    async fn accessible_by(
        &self,
        member: MemberId,
    ) -> Result<Vec<SharedStorage>, ApplicationError> {
        Ok(self
            .state
            .read()
            .storages
            .values()
            .filter(|s| s.can_access(member))
            .cloned()
            .collect())
    }

    async fn grant(
        &self,
        storage: StorageId,
        members: Vec<MemberId>,
    ) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        let stored = state
            .storages
            .get_mut(&storage)
            .ok_or_else(|| ApplicationError::not_found("Storage", storage))?;
        let added = stored.grant(members);
        debug!(storage = %storage, added, "Storage access granted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use domain::AccountKind;

    use super::*;

    #[tokio::test]
    async fn update_keeps_account_kind() {
        let world = InMemoryWorld::new();
        let holder = world.add_member("Holder");
        let id = world.add_account(Account::new("Wallet", AccountKind::Personal { holder }));

        let mut changed = world.account_record(id).unwrap();
        changed.kind = AccountKind::Shared;
        changed.users.clear();
        AccountStorePort::update(&world, &changed).await.unwrap();

        let stored = world.account_record(id).unwrap();
        assert_eq!(stored.holder(), Some(holder));
        assert!(stored.users.is_empty());
    }

    #[tokio::test]
    async fn managed_by_lists_managed_accounts() {
        let world = InMemoryWorld::new();
        let manager = world.add_member("Manager");
        let mut shared = Account::new("Pool", AccountKind::Shared);
        shared.managers.insert(manager);
        let pool = world.add_account(shared);
        world.add_account(Account::new("Other", AccountKind::Shared));

        let managed = world.managed_by(manager).await.unwrap();
        assert_eq!(managed.iter().map(|a| a.id).collect::<Vec<_>>(), vec![pool]);
    }

    #[tokio::test]
    async fn grant_extends_access() {
        let world = InMemoryWorld::new();
        let a = world.add_member("A");
        let b = world.add_member("B");
        let id = world.add_storage(SharedStorage::new("Crate"));

        world.grant(id, vec![a, b, a]).await.unwrap();

        let accessible = world.accessible_by(b).await.unwrap();
        assert_eq!(accessible.len(), 1);
        assert_eq!(world.storage_record(id).unwrap().access.len(), 2);
    }
}
