//! Response payloads of the Service Manager list endpoints.
//!
//! Structural fields (`num_items`, item `id`) are mandatory and fail decoding when absent.
//! Binding credentials are best effort: every missing or unexpected value decodes as an empty
//! string.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Common envelope of `GET /v1/<resource>` responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListResponse<T> {
    pub num_items: i64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// A service offering or a service plan resolved by catalog name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default)]
    pub catalog_name: String,
}

/// Only `id` is mandatory. Missing, null or mistyped descriptive fields decode as empty or `false`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceInstance {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub ready: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub usable: bool,
}

pub type InstanceList = ListResponse<ServiceInstance>;

/// Bindings of a service instance. `num_items` is not relied upon here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BindingList {
    #[serde(default)]
    pub items: Vec<Binding>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Binding {
    #[serde(default, deserialize_with = "lenient_credentials")]
    pub credentials: BindingCredentials,
}

#[derive(Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BindingCredentials {
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub port: String,
    #[serde(deserialize_with = "lenient_string")]
    pub driver: String,
    #[serde(deserialize_with = "lenient_string")]
    pub schema: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(deserialize_with = "lenient_string")]
    pub user: String,
    #[serde(deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hdi_user: String,
    #[serde(deserialize_with = "lenient_string")]
    pub hdi_password: String,
    #[serde(deserialize_with = "lenient_string")]
    pub certificate: String,
}

impl BindingCredentials {
    /// Collapses the certificate to a single line so it fits single line output fields.
    pub fn with_single_line_certificate(mut self) -> Self {
        self.certificate.retain(|c| c != '\n' && c != '\r');
        self
    }
}

impl std::fmt::Debug for BindingCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("schema", &self.schema)
            .field("user", &self.user)
            .field("password", &"<hidden>")
            .field("hdi_user", &self.hdi_user)
            .field("hdi_password", &"<hidden>")
            .finish_non_exhaustive()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_credentials<'de, D>(deserializer: D) -> Result<BindingCredentials, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_without_num_items_fails() {
        let result = serde_json::from_str::<ListResponse<CatalogEntry>>(r#"{"items": []}"#);

        assert!(result.unwrap_err().to_string().contains("num_items"));
    }

    fn decode_list<T: serde::de::DeserializeOwned>(body: &str) -> ListResponse<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn list_without_items_is_empty() {
        let list: ListResponse<CatalogEntry> = decode_list(r#"{"num_items": 0}"#);

        assert_eq!(list.num_items, 0);
        assert!(list.items.is_empty());
    }

    #[test]
    fn null_instance_fields_do_not_drop_the_list() {
        let list: InstanceList = decode_list(
            r#"{
                "num_items": 2,
                "items": [
                    {"id": "inst-1", "name": "db1", "ready": true, "usable": true},
                    {"id": "inst-2", "name": null, "ready": null, "usable": "yes",
                     "created_at": null, "updated_at": 1704880800}
                ]
            }"#,
        );

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].name, "db1");
        assert!(list.items[0].ready);
        assert_eq!(
            list.items[1],
            ServiceInstance {
                id: "inst-2".into(),
                name: String::new(),
                created_at: String::new(),
                updated_at: "1704880800".into(),
                ready: false,
                usable: false,
            }
        );
    }

    #[test]
    fn instance_still_requires_an_id() {
        let result = serde_json::from_str::<InstanceList>(
            r#"{"num_items": 1, "items": [{"name": "db1"}]}"#,
        );

        assert!(result.unwrap_err().to_string().contains("id"));
    }

    #[test]
    fn catalog_entry_requires_an_id() {
        let result = serde_json::from_str::<ListResponse<CatalogEntry>>(
            r#"{"num_items": 1, "items": [{"catalog_name": "hana"}]}"#,
        );

        assert!(result.unwrap_err().to_string().contains("id"));
    }

    #[test]
    fn instances_keep_api_values_verbatim() {
        let list: InstanceList = serde_json::from_str(
            r#"{
                "num_items": 1,
                "items": [{
                    "id": "inst-1",
                    "name": "db1",
                    "created_at": "2024-01-10T10:00:00.123456Z",
                    "updated_at": "2024-01-11T10:00:00Z",
                    "ready": true,
                    "usable": false,
                    "labels": {"subaccount_id": ["abc"]}
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(
            list.items,
            vec![ServiceInstance {
                id: "inst-1".into(),
                name: "db1".into(),
                created_at: "2024-01-10T10:00:00.123456Z".into(),
                updated_at: "2024-01-11T10:00:00Z".into(),
                ready: true,
                usable: false,
            }]
        );
    }

    #[test]
    fn missing_or_odd_credential_fields_are_empty() {
        let list: BindingList = serde_json::from_str(
            r#"{"items": [{"credentials": {"host": "h.example.com", "port": 443, "schema": null, "user": ["x"]}}]}"#,
        )
        .unwrap();
        let credentials = &list.items[0].credentials;

        assert_eq!(credentials.host, "h.example.com");
        assert_eq!(credentials.port, "443");
        assert_eq!(credentials.schema, "");
        assert_eq!(credentials.user, "");
        assert_eq!(credentials.password, "");
    }

    #[test]
    fn binding_without_credentials_object_is_empty() {
        let list: BindingList =
            serde_json::from_str(r#"{"items": [{"id": "b1"}, {"credentials": "nope"}]}"#).unwrap();

        assert_eq!(list.items[0].credentials, BindingCredentials::default());
        assert_eq!(list.items[1].credentials, BindingCredentials::default());
    }

    #[test]
    fn certificate_newlines_are_removed() {
        let credentials = BindingCredentials {
            certificate: "line1\nline2\nline3".into(),
            ..Default::default()
        }
        .with_single_line_certificate();

        assert_eq!(credentials.certificate, "line1line2line3");
    }

    #[test]
    fn certificate_carriage_returns_are_removed() {
        let credentials = BindingCredentials {
            certificate: "-----BEGIN CERTIFICATE-----\r\nMIIB\r\n-----END CERTIFICATE-----\r\n"
                .into(),
            ..Default::default()
        }
        .with_single_line_certificate();

        assert_eq!(
            credentials.certificate,
            "-----BEGIN CERTIFICATE-----MIIB-----END CERTIFICATE-----"
        );
    }
}
