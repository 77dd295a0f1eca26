use application::{
    ApplicationError,
    ports::{ChangeEvent, PropertyStorePort, WatchTarget},
};
use async_trait::async_trait;
use domain::{MemberId, OwnerChangeKind, Property, PropertyId, SettlementId, WorldPosition};
use tracing::{debug, info};

use super::{InMemoryWorld, OwnerTransfer, WorldState};

#[async_trait]
impl PropertyStorePort for InMemoryWorld {
    async fn get(&self, id: PropertyId) -> Result<Option<Property>, ApplicationError> {
        Ok(self.state.read().properties.get(&id).cloned())
    }

    async fn owned_by(&self, owner: MemberId) -> Result<Vec<Property>, ApplicationError> {
        Ok(self
            .state
            .read()
            .properties
            .values()
            .filter(|p| p.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn at_position(
        &self,
        position: WorldPosition,
    ) -> Result<Option<Property>, ApplicationError> {
        let state = self.state.read();
        Ok(state
            .claims
            .get(&position)
            .and_then(|id| state.properties.get(id))
            .cloned())
    }

    async fn update(&self, property: &Property) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        let stored = state
            .properties
            .get_mut(&property.id)
            .ok_or_else(|| ApplicationError::not_found("Property", property.id))?;
        let owner = stored.owner;
        *stored = property.clone();
        stored.owner = owner;
        state.dirty_properties.insert(property.id);
        Ok(())
    }

    async fn transfer(
        &self,
        id: PropertyId,
        new_owner: Option<MemberId>,
        kind: OwnerChangeKind,
    ) -> Result<(), ApplicationError> {
        let before = {
            let mut state = self.state.write();
            let property = state
                .properties
                .get_mut(&id)
                .ok_or_else(|| ApplicationError::not_found("Property", id))?;
            let before = property.owner;
            property.owner = new_owner;
            state.dirty_properties.insert(id);
            state.transfers.push(OwnerTransfer {
                property: id,
                before,
                after: new_owner,
                kind,
            });
            before
        };
        if before == new_owner {
            return Ok(());
        }
        debug!(property = %id, ?before, after = ?new_owner, ?kind, "Owner changed");

        self.publish(
            WatchTarget::PropertyOwner(id),
            ChangeEvent::OwnerChanged {
                property: id,
                before,
                after: new_owner,
            },
        )
        .await;
        if let Some(new_owner) = new_owner {
            self.publish(
                WatchTarget::Acquisitions,
                ChangeEvent::PropertyAcquired {
                    property: id,
                    new_owner,
                },
            )
            .await;
        }
        Ok(())
    }

    async fn rename(&self, id: PropertyId, desired: &str) -> Result<String, ApplicationError> {
        let mut state = self.state.write();
        let name = WorldState::unique_name(
            desired,
            state
                .properties
                .values()
                .filter(|p| p.id != id)
                .map(|p| p.name.as_str()),
        );
        let property = state
            .properties
            .get_mut(&id)
            .ok_or_else(|| ApplicationError::not_found("Property", id))?;
        property.name.clone_from(&name);
        state.dirty_properties.insert(id);
        Ok(name)
    }

    async fn open_rent_editor(
        &self,
        id: PropertyId,
        editor: MemberId,
    ) -> Result<(), ApplicationError> {
        let mut state = self.state.write();
        let owned = state
            .properties
            .get(&id)
            .ok_or_else(|| ApplicationError::not_found("Property", id))?
            .is_owned_by(editor);
        if !owned {
            return Err(ApplicationError::Rejected(format!(
                "{editor} does not own the property"
            )));
        }
        if let Some(reason) = state.fail_rent_editor.take() {
            return Err(ApplicationError::ExternalService(reason));
        }
        state.rent_edits.push((id, editor));
        info!(property = %id, editor = %editor, "Rent editor opened");
        Ok(())
    }

    async fn refresh_settlement_influence(
        &self,
        id: PropertyId,
    ) -> Result<Option<SettlementId>, ApplicationError> {
        let mut state = self.state.write();
        let influence = state.influence.get(&id).copied();
        let property = state
            .properties
            .get_mut(&id)
            .ok_or_else(|| ApplicationError::not_found("Property", id))?;
        property.settlement = influence;
        Ok(influence)
    }
}
