//! Read access to the Service Manager REST API.

pub mod error;
pub mod field_query;
pub mod http;
pub mod response;

use error::ServiceManagerError;
use response::{BindingCredentials, CatalogEntry, InstanceList};

/// Lookups performed against the Service Manager API. Every filter is evaluated server side.
pub trait ServiceManager {
    /// Service offering with the given catalog name, if any.
    fn find_offering(&self, catalog_name: &str) -> Result<Option<CatalogEntry>, ServiceManagerError>;

    /// Plan with the given catalog name belonging to the offering `offering_id`, if any.
    fn find_plan(
        &self,
        catalog_name: &str,
        offering_id: &str,
    ) -> Result<Option<CatalogEntry>, ServiceManagerError>;

    /// Service instances of the plan `plan_id`, as returned by a single call.
    fn list_instances(&self, plan_id: &str) -> Result<InstanceList, ServiceManagerError>;

    /// Credentials of the first binding of the instance `instance_id`. Missing values are empty.
    fn binding_credentials(
        &self,
        instance_id: &str,
    ) -> Result<BindingCredentials, ServiceManagerError>;
}
