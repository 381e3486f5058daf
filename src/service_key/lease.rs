use tracing::{info, warn};

use super::{ServiceKey, ServiceKeyError};
use crate::host::{HostCli, HostError};

/// A service key created for the duration of a run.
///
/// The key is deleted exactly once: by [ServiceKeyLease::release], or when the lease is dropped
/// without having been released.
pub struct ServiceKeyLease<'a, H: HostCli> {
    host: &'a H,
    instance: String,
    key_name: String,
    released: bool,
}

impl<'a, H: HostCli> ServiceKeyLease<'a, H> {
    /// Creates the service key `key_name` for `instance` through the host CLI.
    pub fn create(host: &'a H, instance: &str, key_name: &str) -> Result<Self, HostError> {
        host.create_service_key(instance, key_name)?;
        info!(instance, key_name, "service key created");

        Ok(Self {
            host,
            instance: instance.to_string(),
            key_name: key_name.to_string(),
            released: false,
        })
    }

    /// Reads and decodes the leased service key.
    pub fn fetch(&self) -> Result<ServiceKey, ServiceKeyError> {
        let lines = self.host.service_key(&self.instance, &self.key_name)?;
        ServiceKey::from_command_output(&lines)
    }

    /// Deletes the service key, reporting the failure if any.
    pub fn release(mut self) -> Result<(), HostError> {
        self.released = true;
        self.delete()
    }

    fn delete(&self) -> Result<(), HostError> {
        self.host
            .delete_service_key(&self.instance, &self.key_name)?;
        info!(instance = %self.instance, key_name = %self.key_name, "service key deleted");
        Ok(())
    }
}

impl<H: HostCli> Drop for ServiceKeyLease<'_, H> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = self.delete() {
            warn!(key_name = %self.key_name, "could not delete service key: {err}");
        }
    }
}
