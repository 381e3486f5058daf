use std::fmt::Write;

use super::{RenderError, Renderer};
use crate::listing::{InstanceDetails, InstanceListing};

/// Human readable report: a summary line, then one block per instance.
pub struct TxtRenderer {
    show_credentials: bool,
}

impl TxtRenderer {
    pub fn new(show_credentials: bool) -> Self {
        Self { show_credentials }
    }

    fn write_instance(&self, out: &mut String, details: &InstanceDetails) -> std::fmt::Result {
        let instance = &details.instance;
        let creds = &details.credentials;
        writeln!(out)?;
        writeln!(out, "Name: {}", instance.name)?;
        writeln!(out, "Id: {}", instance.id)?;
        writeln!(out, "CreatedAt: {}", instance.created_at)?;
        writeln!(out, "UpdatedAt: {}", instance.updated_at)?;
        writeln!(out, "Ready: {}", instance.ready)?;
        writeln!(out, "Usable: {}", instance.usable)?;
        writeln!(out, "Schema: {}", creds.schema)?;
        writeln!(out, "Host: {}", creds.host)?;
        writeln!(out, "Port: {}", creds.port)?;
        writeln!(out, "URL: {}", creds.url)?;
        writeln!(out, "Driver: {}", creds.driver)?;
        if self.show_credentials {
            writeln!(out, "User: {}", creds.user)?;
            writeln!(out, "Password: {}", creds.password)?;
            writeln!(out, "HDIUser: {}", creds.hdi_user)?;
            writeln!(out, "HDIPassword: {}", creds.hdi_password)?;
            writeln!(out, "Certificate: {}", creds.certificate)?;
        }
        Ok(())
    }
}

impl Renderer for TxtRenderer {
    fn render(&self, listing: &InstanceListing) -> Result<String, RenderError> {
        let mut out = String::new();
        writeln!(
            out,
            "{} items found for service offering {} and service plan {}.",
            listing.num_items, listing.service_offering, listing.service_plan
        )?;
        for details in &listing.instances {
            self.write_instance(&mut out, details)?;
        }
        Ok(out)
    }
}
