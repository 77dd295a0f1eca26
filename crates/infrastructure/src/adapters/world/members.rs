use application::{
    ApplicationError,
    ports::{MemberDirectoryPort, ProvisioningPort},
};
use async_trait::async_trait;
use domain::{Account, AccountKind, CurrencyId, Member, MemberId, SettlementId};
use tracing::info;

use super::{InMemoryWorld, WorldState};

#[async_trait]
impl MemberDirectoryPort for InMemoryWorld {
    async fn get(&self, id: MemberId) -> Result<Option<Member>, ApplicationError> {
        Ok(self.state.read().members.get(&id).cloned())
    }

    async fn update(&self, member: &Member) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        let stored = state
            .members
            .get_mut(&member.id)
            .ok_or_else(|| ApplicationError::not_found("Member", member.id))?;
        let citizenship = stored.citizenship;
        *stored = member.clone();
        stored.citizenship = citizenship;
        Ok(())
    }

    async fn set_citizenship(
        &self,
        id: MemberId,
        citizenship: Option<SettlementId>,
    ) -> Result<(), ApplicationError> {
        let before = {
            let mut state = self.state.write();
            let member = state
                .members
                .get_mut(&id)
                .ok_or_else(|| ApplicationError::not_found("Member", id))?;
            std::mem::replace(&mut member.citizenship, citizenship)
        };
        self.publish_citizenship(id, before, citizenship).await;
        Ok(())
    }
}

#[async_trait]
impl ProvisioningPort for InMemoryWorld {
    async fn create_legal_identity(
        &self,
        base_name: &str,
        logout_time: f64,
    ) -> Result<Member, ApplicationError> {
        let mut state = self.state.write();
        let name =
            WorldState::unique_name(base_name, state.members.values().map(|m| m.name.as_str()));
        let mut member = Member::new(MemberId::new(), name);
        member.logout_time = logout_time;
        state.members.insert(member.id, member.clone());
        info!(member = %member.id, name = %member.name, "Legal identity created");
        Ok(member)
    }

    async fn open_treasury(
        &self,
        holder: MemberId,
        base_name: &str,
    ) -> Result<Account, ApplicationError> {
        let mut state = self.state.write();
        if !state.members.contains_key(&holder) {
            return Err(ApplicationError::not_found("Member", holder));
        }
        let name =
            WorldState::unique_name(base_name, state.accounts.values().map(|a| a.name.as_str()));
        let account = Account::new(name, AccountKind::Personal { holder });
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn issue_currency(
        &self,
        issuer: MemberId,
        base_name: &str,
    ) -> Result<CurrencyId, ApplicationError> {
        let mut state = self.state.write();
        let name = WorldState::unique_name(
            base_name,
            state.currencies.values().map(|(_, name)| name.as_str()),
        );
        let id = CurrencyId::new();
        state.currencies.insert(id, (issuer, name));
        Ok(id)
    }
}
