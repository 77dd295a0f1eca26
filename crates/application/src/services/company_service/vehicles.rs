//! Employee vehicles handed to the company

use domain::{CompanyId, OwnerChangeKind, vehicle_transfer_name};
use tracing::{debug, instrument};

use super::CompanyService;
use crate::error::ApplicationError;

impl CompanyService {
    /// Rename, recolour and transfer every employee vehicle to the legal identity
    #[instrument(skip(self))]
    pub(super) async fn update_all_vehicles(&self, company: CompanyId) -> Result<(), ApplicationError> {
        if !self.policy.vehicle_transfers_enabled {
            return Ok(());
        }
        let c = self.company(company).await?;
        let legal = self.legal_member(&c).await?;
        let replacement = if self.policy.vehicle_transfers_use_company_name_enabled {
            c.name.clone()
        } else {
            legal.name.clone()
        };
        let hq_color = self.headquarters(&c).await?.and_then(|hq| hq.color);

        for employee in c.all_employees() {
            let vehicles = self
                .ports
                .properties
                .owned_by(employee)
                .await?
                .into_iter()
                .filter(|p| p.is_vehicle() && !p.is_owned_by(legal.id));
            for vehicle in vehicles {
                let previous = match vehicle.creator.or(vehicle.owner) {
                    Some(id) => Some(self.member_name(id).await),
                    None => None,
                };
                let desired = vehicle_transfer_name(
                    &vehicle.name,
                    previous.as_deref(),
                    &replacement,
                    &vehicle.id.short(),
                );
                let name = self.ports.properties.rename(vehicle.id, &desired).await?;
                if let Some(color) = hq_color {
                    let mut recoloured = self.property(vehicle.id).await?;
                    recoloured.color = Some(color);
                    self.ports.properties.update(&recoloured).await?;
                }
                debug!(company = %company, property = %vehicle.id, %name, "Vehicle handed to company");
                self.ports
                    .properties
                    .transfer(vehicle.id, Some(legal.id), OwnerChangeKind::Normal)
                    .await?;
            }
            self.invalidate_member_view(company, employee).await;
        }
        self.invalidate_member_view(company, legal.id).await;
        Ok(())
    }
}
