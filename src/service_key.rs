//! Temporary service key ("service key") material used to reach the Service Manager API.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::authenticator::{ClientCredentials, ClientSecret};
use crate::host::HostError;

pub mod lease;

/// Leading lines of the host CLI `service-key` output that are not part of the JSON document.
const HEADER_LINES: usize = 2;

#[derive(Error, Debug)]
pub enum ServiceKeyError {
    #[error("reading service key: {0}")]
    Command(#[from] HostError),
    #[error("service key output has no JSON document after its header lines")]
    MissingDocument,
    #[error("decoding service key: `{0}`")]
    Decode(String),
    #[error("invalid `{0}` url `{1}`: `{2}`")]
    InvalidUrl(&'static str, String, String),
}

/// Credential material of a Service Manager service key.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceKey {
    token_issuer_url: Url,
    sm_url: Url,
    credentials: ClientCredentials,
}

/// Fields read from the service key JSON document. Any other field is ignored.
#[derive(Deserialize)]
struct ServiceKeyFields {
    url: String,
    sm_url: String,
    clientid: String,
    clientsecret: ClientSecret,
}

impl ServiceKey {
    /// Parses the output lines of the host CLI `service-key` command. The header lines are
    /// discarded and the rest is decoded as JSON, either flat or wrapped in a `credentials` object.
    pub fn from_command_output(lines: &[String]) -> Result<Self, ServiceKeyError> {
        let document = lines
            .get(HEADER_LINES..)
            .map(|rest| rest.join("\n"))
            .filter(|rest| !rest.trim().is_empty())
            .ok_or(ServiceKeyError::MissingDocument)?;

        Self::from_json(&document)
    }

    pub fn from_json(document: &str) -> Result<Self, ServiceKeyError> {
        let mut value: Value =
            serde_json::from_str(document).map_err(|e| ServiceKeyError::Decode(e.to_string()))?;

        if let Some(credentials) = value.get_mut("credentials").filter(|c| c.is_object()) {
            value = credentials.take();
        }

        let fields: ServiceKeyFields =
            serde_json::from_value(value).map_err(|e| ServiceKeyError::Decode(e.to_string()))?;

        Ok(Self {
            token_issuer_url: parse_url("url", &fields.url)?,
            sm_url: parse_url("sm_url", &fields.sm_url)?,
            credentials: ClientCredentials::new(fields.clientid, fields.clientsecret),
        })
    }

    /// Base URL of the OAuth token issuer.
    pub fn token_issuer_url(&self) -> &Url {
        &self.token_issuer_url
    }

    /// Base URL of the Service Manager API.
    pub fn sm_url(&self) -> &Url {
        &self.sm_url
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ServiceKeyError> {
    Url::parse(value).map_err(|e| ServiceKeyError::InvalidUrl(field, value.to_string(), e.to_string()))
}
