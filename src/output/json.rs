use serde::Serialize;

use super::{RenderError, Renderer};
use crate::listing::{InstanceDetails, InstanceListing};

/// Renders the listing as a single compact JSON document.
pub struct JsonRenderer {
    show_credentials: bool,
}

impl JsonRenderer {
    pub fn new(show_credentials: bool) -> Self {
        Self { show_credentials }
    }
}

#[derive(Serialize)]
struct Document<'a> {
    service_offering: &'a str,
    service_plan: &'a str,
    num_items: i64,
    items: Vec<Item<'a>>,
}

#[derive(Serialize)]
struct Item<'a> {
    name: &'a str,
    id: &'a str,
    created_at: &'a str,
    updated_at: &'a str,
    ready: bool,
    usable: bool,
    schema: &'a str,
    host: &'a str,
    port: &'a str,
    url: &'a str,
    driver: &'a str,
    #[serde(flatten)]
    credentials: Option<Credentials<'a>>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    user: &'a str,
    password: &'a str,
    hdi_user: &'a str,
    hdi_password: &'a str,
    certificate: &'a str,
}

impl<'a> Item<'a> {
    fn new(details: &'a InstanceDetails, show_credentials: bool) -> Self {
        let instance = &details.instance;
        let creds = &details.credentials;
        Self {
            name: &instance.name,
            id: &instance.id,
            created_at: &instance.created_at,
            updated_at: &instance.updated_at,
            ready: instance.ready,
            usable: instance.usable,
            schema: &creds.schema,
            host: &creds.host,
            port: &creds.port,
            url: &creds.url,
            driver: &creds.driver,
            credentials: show_credentials.then(|| Credentials {
                user: &creds.user,
                password: &creds.password,
                hdi_user: &creds.hdi_user,
                hdi_password: &creds.hdi_password,
                certificate: &creds.certificate,
            }),
        }
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, listing: &InstanceListing) -> Result<String, RenderError> {
        let document = Document {
            service_offering: &listing.service_offering,
            service_plan: &listing.service_plan,
            num_items: listing.num_items,
            items: listing
                .instances
                .iter()
                .map(|details| Item::new(details, self.show_credentials))
                .collect(),
        };
        let mut rendered = serde_json::to_string(&document)?;
        rendered.push('\n');
        Ok(rendered)
    }
}
