//! Collaboration with the platform CLI hosting this tool.

use thiserror::Error;

pub mod cf;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("running `{0}`: `{1}`")]
    Spawn(String, String),
    #[error("`{command}` failed with {status}: {output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },
}

/// Operations consumed from the host platform CLI.
pub trait HostCli {
    /// Verifies the named service instance is visible to the caller.
    fn get_service(&self, name: &str) -> Result<(), HostError>;

    /// Creates the service key `key_name` for the service instance `instance`.
    fn create_service_key(&self, instance: &str, key_name: &str) -> Result<(), HostError>;

    /// Returns the raw output lines describing the service key, headers included.
    fn service_key(&self, instance: &str, key_name: &str) -> Result<Vec<String>, HostError>;

    /// Deletes the service key without asking for confirmation.
    fn delete_service_key(&self, instance: &str, key_name: &str) -> Result<(), HostError>;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        pub HostCli {}

        impl HostCli for HostCli {
            fn get_service(&self, name: &str) -> Result<(), HostError>;
            fn create_service_key(&self, instance: &str, key_name: &str) -> Result<(), HostError>;
            fn service_key(&self, instance: &str, key_name: &str) -> Result<Vec<String>, HostError>;
            fn delete_service_key(&self, instance: &str, key_name: &str) -> Result<(), HostError>;
        }
    }
}
