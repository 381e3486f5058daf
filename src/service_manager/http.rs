use http::{Method, Request, Response, Uri, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::ServiceManager;
use super::error::ServiceManagerError;
use super::field_query::FieldQuery;
use super::response::{
    BindingCredentials, BindingList, CatalogEntry, InstanceList, ListResponse,
};
use crate::http_client::HttpClient;
use crate::token::Token;

const SERVICE_OFFERINGS_PATH: &str = "/v1/service_offerings";
const SERVICE_PLANS_PATH: &str = "/v1/service_plans";
const SERVICE_INSTANCES_PATH: &str = "/v1/service_instances";
const SERVICE_BINDINGS_PATH: &str = "/v1/service_bindings";

const FIELD_QUERY_PARAM: &str = "fieldQuery";

/// Implementation of the [ServiceManager] trait for a generic HTTP client, authorized with a
/// bearer token.
pub struct HttpServiceManager<'a, C: HttpClient> {
    http_client: &'a C,
    base_url: Url,
    token: Token,
}

impl<'a, C: HttpClient> HttpServiceManager<'a, C> {
    pub fn new(http_client: &'a C, base_url: Url, token: Token) -> Self {
        Self {
            http_client,
            base_url,
            token,
        }
    }

    fn endpoint(&self, path: &str, query: &FieldQuery) -> Result<Uri, ServiceManagerError> {
        let raw = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|e| ServiceManagerError::InvalidEndpoint(raw.clone(), e.to_string()))?;
        url.query_pairs_mut()
            .append_pair(FIELD_QUERY_PARAM, &query.to_string());

        Uri::try_from(url.as_str())
            .map_err(|e| ServiceManagerError::InvalidEndpoint(url.to_string(), e.to_string()))
    }

    fn get(&self, path: &str, query: &FieldQuery) -> Result<Response<Vec<u8>>, ServiceManagerError> {
        let authorization = self
            .token
            .authorization_header()
            .map_err(ServiceManagerError::Request)?;
        let request = Request::builder()
            .uri(self.endpoint(path, query)?)
            .method(Method::GET)
            .header(AUTHORIZATION, authorization)
            .body(Vec::new())
            .map_err(|e| ServiceManagerError::Request(e.to_string()))?;

        debug!(path, field_query = %query, "querying service manager");
        self.http_client
            .send(request)
            .map_err(|e| ServiceManagerError::Transport(e.to_string()))
    }

    fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &FieldQuery,
    ) -> Result<ListResponse<T>, ServiceManagerError> {
        let response = self.get(path, query)?;
        let body = response.body();
        if !response.status().is_success() {
            return Err(ServiceManagerError::UnsuccessfulResponse {
                path: path.to_string(),
                status: response.status().as_u16(),
                body: String::from_utf8_lossy(body).to_string(),
            });
        }

        let list: ListResponse<T> = serde_json::from_slice(body)
            .map_err(|e| ServiceManagerError::Decoder(path.to_string(), e.to_string()))?;
        debug!(path, num_items = list.num_items, "list retrieved");
        Ok(list)
    }

    /// First item of a catalog lookup, or `None` when nothing matched.
    fn first_match(
        path: &str,
        list: ListResponse<CatalogEntry>,
    ) -> Result<Option<CatalogEntry>, ServiceManagerError> {
        if list.num_items < 1 {
            return Ok(None);
        }
        let num_items = list.num_items;
        list.items
            .into_iter()
            .next()
            .map(Some)
            .ok_or_else(|| ServiceManagerError::MissingItem(path.to_string(), num_items))
    }
}

impl<C: HttpClient> ServiceManager for HttpServiceManager<'_, C> {
    fn find_offering(&self, catalog_name: &str) -> Result<Option<CatalogEntry>, ServiceManagerError> {
        let query = FieldQuery::eq("catalog_name", catalog_name);
        let list = self.list(SERVICE_OFFERINGS_PATH, &query)?;
        Self::first_match(SERVICE_OFFERINGS_PATH, list)
    }

    fn find_plan(
        &self,
        catalog_name: &str,
        offering_id: &str,
    ) -> Result<Option<CatalogEntry>, ServiceManagerError> {
        let query =
            FieldQuery::eq("catalog_name", catalog_name).and_eq("service_offering_id", offering_id);
        let list = self.list(SERVICE_PLANS_PATH, &query)?;
        Self::first_match(SERVICE_PLANS_PATH, list)
    }

    fn list_instances(&self, plan_id: &str) -> Result<InstanceList, ServiceManagerError> {
        let query = FieldQuery::eq("service_plan_id", plan_id);
        self.list(SERVICE_INSTANCES_PATH, &query)
    }

    fn binding_credentials(
        &self,
        instance_id: &str,
    ) -> Result<BindingCredentials, ServiceManagerError> {
        let query = FieldQuery::eq("service_instance_id", instance_id);
        let response = self.get(SERVICE_BINDINGS_PATH, &query)?;
        let body = response.body();

        if !response.status().is_success() {
            warn!(
                instance_id,
                status = response.status().as_u16(),
                "binding lookup failed, credentials left empty"
            );
            return Ok(BindingCredentials::default());
        }

        let bindings: BindingList = match serde_json::from_slice(body) {
            Ok(bindings) => bindings,
            Err(err) => {
                warn!(instance_id, "undecodable bindings, credentials left empty: {err}");
                return Ok(BindingCredentials::default());
            }
        };

        match bindings.items.into_iter().next() {
            Some(binding) => Ok(binding.credentials.with_single_line_certificate()),
            None => {
                debug!(instance_id, "instance has no binding");
                Ok(BindingCredentials::default())
            }
        }
    }
}
