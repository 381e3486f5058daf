use serde::Serialize;

use super::{RenderError, Renderer};
use crate::listing::{InstanceDetails, InstanceListing};

const DIALECT: &str = "SAPHana";
const CONNECTION_TIMEOUT_SECS: u32 = 30;
const OWNER_SUFFIX: &str = ":OWNER";

/// Renders a `sqltools.connections` settings fragment, ready to paste into an editor settings
/// file. Every instance yields a runtime user connection followed by an HDI owner connection.
pub struct SqlToolsRenderer {
    management_instance: String,
}

impl SqlToolsRenderer {
    pub fn new(management_instance: String) -> Self {
        Self {
            management_instance,
        }
    }

    fn connections<'a>(&'a self, details: &'a InstanceDetails) -> [Connection<'a>; 2] {
        let creds = &details.credentials;
        let name = format!("{}:{}", self.management_instance, details.instance.name);
        let connection = move |name: String, username: &'a str, password: &'a str| Connection {
            name,
            dialect: DIALECT,
            server: &creds.host,
            port: Port::from(creds.port.as_str()),
            database: &creds.schema,
            username,
            password,
            connection_timeout: CONNECTION_TIMEOUT_SECS,
            hana_options: HanaOptions {
                encrypt: true,
                ssl_validate_certificate: true,
                ssl_crypto_provider: "openssl",
                ssl_trust_store: &creds.certificate,
            },
        };
        [
            connection(name.clone(), &creds.user, &creds.password),
            connection(
                format!("{name}{OWNER_SUFFIX}"),
                &creds.hdi_user,
                &creds.hdi_password,
            ),
        ]
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Connection<'a> {
    name: String,
    dialect: &'static str,
    server: &'a str,
    port: Port<'a>,
    database: &'a str,
    username: &'a str,
    password: &'a str,
    connection_timeout: u32,
    hana_options: HanaOptions<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HanaOptions<'a> {
    encrypt: bool,
    ssl_validate_certificate: bool,
    ssl_crypto_provider: &'static str,
    ssl_trust_store: &'a str,
}

/// Port as a JSON number when it is one, kept as text otherwise so the fragment stays valid.
#[derive(Debug, PartialEq, Serialize)]
#[serde(untagged)]
enum Port<'a> {
    Number(u16),
    Text(&'a str),
}

impl<'a> From<&'a str> for Port<'a> {
    fn from(value: &'a str) -> Self {
        value
            .trim()
            .parse()
            .map(Port::Number)
            .unwrap_or(Port::Text(value))
    }
}

impl Renderer for SqlToolsRenderer {
    fn render(&self, listing: &InstanceListing) -> Result<String, RenderError> {
        let entries = listing
            .instances
            .iter()
            .flat_map(|details| self.connections(details))
            .map(|connection| serde_json::to_string(&connection))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!(
            "\"sqltools.connections\": [{}],\n",
            entries.join(",")
        ))
    }
}
