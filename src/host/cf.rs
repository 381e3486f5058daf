use std::ffi::OsString;
use std::process::Command;

use tracing::debug;

use super::{HostCli, HostError};

pub const DEFAULT_HOST_CLI: &str = "cf";

/// [HostCli] backed by the platform CLI executable, usually [DEFAULT_HOST_CLI].
#[derive(Debug, Clone)]
pub struct CfCli {
    executable: OsString,
}

impl CfCli {
    pub fn new(executable: impl Into<OsString>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Runs the executable with `args` and returns its standard output split in lines.
    fn run(&self, args: &[&str]) -> Result<Vec<String>, HostError> {
        let command = args.first().copied().unwrap_or_default().to_string();
        debug!(%command, "running host cli command");

        let output = Command::new(&self.executable)
            .args(args)
            .output()
            .map_err(|e| HostError::Spawn(command.clone(), e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // the cf CLI reports most failures on stdout
            let details = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(HostError::CommandFailed {
                command,
                status: output.status.to_string(),
                output: details.to_string(),
            });
        }

        Ok(stdout.lines().map(String::from).collect())
    }
}

impl HostCli for CfCli {
    fn get_service(&self, name: &str) -> Result<(), HostError> {
        self.run(&["service", name, "--guid"]).map(|_| ())
    }

    fn create_service_key(&self, instance: &str, key_name: &str) -> Result<(), HostError> {
        self.run(&["create-service-key", instance, key_name])
            .map(|_| ())
    }

    fn service_key(&self, instance: &str, key_name: &str) -> Result<Vec<String>, HostError> {
        self.run(&["service-key", instance, key_name])
    }

    fn delete_service_key(&self, instance: &str, key_name: &str) -> Result<(), HostError> {
        self.run(&["delete-service-key", instance, key_name, "-f"])
            .map(|_| ())
    }
}
