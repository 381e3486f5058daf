//! Resolution chain from offering and plan names down to the instances and their credentials.

use tracing::debug;

use crate::service_manager::ServiceManager;
use crate::service_manager::error::ServiceManagerError;
use crate::service_manager::response::{BindingCredentials, ServiceInstance};

/// A service instance together with the credentials of its binding.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceDetails {
    pub instance: ServiceInstance,
    pub credentials: BindingCredentials,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceListing {
    pub service_offering: String,
    pub service_plan: String,
    /// Count reported by the instances lookup.
    pub num_items: i64,
    pub instances: Vec<InstanceDetails>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    OfferingNotFound(String),
    PlanNotFound(String),
    Found(InstanceListing),
}

pub struct InstanceLister<'a, S: ServiceManager> {
    service_manager: &'a S,
}

impl<'a, S: ServiceManager> InstanceLister<'a, S> {
    pub fn new(service_manager: &'a S) -> Self {
        Self { service_manager }
    }

    /// Resolves the offering, then its plan, then lists the plan instances and fetches the
    /// binding credentials of each of them, one at a time.
    pub fn list(&self, offering: &str, plan: &str) -> Result<ListingOutcome, ServiceManagerError> {
        let Some(offering_entry) = self.service_manager.find_offering(offering)? else {
            debug!(offering, "service offering not found");
            return Ok(ListingOutcome::OfferingNotFound(offering.to_string()));
        };

        let Some(plan_entry) = self
            .service_manager
            .find_plan(plan, &offering_entry.id)?
        else {
            debug!(plan, offering_id = %offering_entry.id, "service plan not found");
            return Ok(ListingOutcome::PlanNotFound(plan.to_string()));
        };

        let instances = self.service_manager.list_instances(&plan_entry.id)?;
        let details = instances
            .items
            .into_iter()
            .map(|instance| {
                let credentials = self.service_manager.binding_credentials(&instance.id)?;
                Ok(InstanceDetails {
                    instance,
                    credentials,
                })
            })
            .collect::<Result<Vec<_>, ServiceManagerError>>()?;

        Ok(ListingOutcome::Found(InstanceListing {
            service_offering: offering.to_string(),
            service_plan: plan.to_string(),
            num_items: instances.num_items,
            instances: details,
        }))
    }
}
