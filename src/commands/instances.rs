use tracing::{debug, warn};

use crate::Error;
use crate::authenticator::{Authenticator, HttpAuthenticator};
use crate::host::HostCli;
use crate::http_client::HttpClient;
use crate::listing::{InstanceLister, ListingOutcome};
use crate::output::{OutputFormat, RenderOptions};
use crate::service_key::lease::ServiceKeyLease;
use crate::service_manager::http::HttpServiceManager;

/// Name of the temporary service key created on the Service Manager instance.
pub const SERVICE_KEY_NAME: &str = "sk-service-manager-service-instances";

/// Validated input of the instances listing.
#[derive(Debug, Clone, PartialEq)]
pub struct InstancesRequest {
    pub management_instance: String,
    pub offering: String,
    pub plan: String,
    pub show_credentials: bool,
    pub output_format: OutputFormat,
}

/// Lists the service instances of an offering plan through a Service Manager instance.
pub struct InstancesCommand<'a, H, C>
where
    H: HostCli,
    C: HttpClient,
{
    host: &'a H,
    http_client: &'a C,
}

impl<'a, H, C> InstancesCommand<'a, H, C>
where
    H: HostCli,
    C: HttpClient,
{
    pub fn new(host: &'a H, http_client: &'a C) -> Self {
        Self { host, http_client }
    }

    /// Runs the whole listing and returns the text to print. The temporary service key is
    /// deleted before returning, whatever the outcome.
    pub fn execute(&self, request: &InstancesRequest) -> Result<String, Error> {
        self.host.get_service(&request.management_instance)?;

        let lease = ServiceKeyLease::create(self.host, &request.management_instance, SERVICE_KEY_NAME)?;
        let output = self.list(&lease, request);

        if let Err(err) = lease.release() {
            warn!(key_name = SERVICE_KEY_NAME, "could not delete service key: {err}");
        }

        output
    }

    fn list(
        &self,
        lease: &ServiceKeyLease<'_, H>,
        request: &InstancesRequest,
    ) -> Result<String, Error> {
        let key = lease.fetch()?;

        let token = HttpAuthenticator::for_issuer(self.http_client, key.token_issuer_url())?
            .authenticate(key.credentials())?;

        let service_manager = HttpServiceManager::new(self.http_client, key.sm_url().clone(), token);
        let outcome = InstanceLister::new(&service_manager).list(&request.offering, &request.plan)?;
        debug!(offering = %request.offering, plan = %request.plan, "listing resolved");

        match outcome {
            ListingOutcome::OfferingNotFound(name) => {
                Ok(format!("Service offering not found: {name}\n"))
            }
            ListingOutcome::PlanNotFound(name) => Ok(format!("Service plan not found: {name}\n")),
            ListingOutcome::Found(listing) => {
                let options = RenderOptions {
                    management_instance: request.management_instance.clone(),
                    show_credentials: request.show_credentials,
                };
                Ok(request.output_format.renderer(&options).render(&listing)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;
    use crate::host::tests::MockHostCli;
    use crate::http::client::HttpClient as ReqwestHttpClient;
    use crate::http::config::HttpConfig;
    use crate::service_manager::error::ServiceManagerError;
    use assert_matches::assert_matches;
    use httpmock::Method::{GET, POST};
    use httpmock::{Mock, MockServer};
    use mockall::Sequence;
    use serde_json::{Value, json};

    const MANAGEMENT_INSTANCE: &str = "svc";

    fn request(output_format: OutputFormat) -> InstancesRequest {
        InstancesRequest {
            management_instance: MANAGEMENT_INSTANCE.into(),
            offering: "hana".into(),
            plan: "hdi-shared".into(),
            show_credentials: false,
            output_format,
        }
    }

    /// Host CLI handing out a service key pointing both the issuer and the API at `server`.
    fn host(server: &MockServer) -> MockHostCli {
        let base_url = server.base_url();
        let mut host = MockHostCli::new();
        let mut seq = Sequence::new();
        host.expect_get_service()
            .once()
            .in_sequence(&mut seq)
            .withf(|name| name == MANAGEMENT_INSTANCE)
            .returning(|_| Ok(()));
        host.expect_create_service_key()
            .once()
            .in_sequence(&mut seq)
            .withf(|instance, key_name| instance == MANAGEMENT_INSTANCE && key_name == SERVICE_KEY_NAME)
            .returning(|_, _| Ok(()));
        host.expect_service_key()
            .once()
            .in_sequence(&mut seq)
            .returning(move |_, _| {
                let document = json!({
                    "clientid": "sb-client",
                    "clientsecret": "s3cr3t",
                    "url": base_url,
                    "sm_url": base_url,
                });
                Ok(vec![
                    "Getting key sk-service-manager-service-instances for service instance svc..."
                        .to_string(),
                    String::new(),
                    document.to_string(),
                ])
            });
        host.expect_delete_service_key()
            .once()
            .in_sequence(&mut seq)
            .withf(|instance, key_name| instance == MANAGEMENT_INSTANCE && key_name == SERVICE_KEY_NAME)
            .returning(|_, _| Ok(()));
        host
    }

    fn token_mock(server: &MockServer) -> Mock<'_> {
        server.mock(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .query_param("grant_type", "client_credentials");
            then.status(200).json_body(json!({
                "access_token": "sm-token",
                "token_type": "bearer",
                "expires_in": 43199
            }));
        })
    }

    fn list_mock<'a>(server: &'a MockServer, path: &str, query: &str, body: Value) -> Mock<'a> {
        server.mock(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("fieldQuery", query)
                .header("Authorization", "Bearer sm-token");
            then.status(200).json_body(body);
        })
    }

    fn offering_mock(server: &MockServer) -> Mock<'_> {
        list_mock(
            server,
            "/v1/service_offerings",
            "catalog_name eq 'hana'",
            json!({"num_items": 1, "items": [{"id": "off-1", "catalog_name": "hana"}]}),
        )
    }

    fn plan_mock(server: &MockServer) -> Mock<'_> {
        list_mock(
            server,
            "/v1/service_plans",
            "catalog_name eq 'hdi-shared' and service_offering_id eq 'off-1'",
            json!({"num_items": 1, "items": [{"id": "plan-1", "catalog_name": "hdi-shared"}]}),
        )
    }

    fn execute(host: &MockHostCli, output_format: OutputFormat) -> Result<String, Error> {
        let http_client = ReqwestHttpClient::new(HttpConfig::default()).unwrap();
        InstancesCommand::new(host, &http_client).execute(&request(output_format))
    }

    #[test]
    fn lists_instances_with_their_bindings() {
        let server = MockServer::start();
        let host = host(&server);
        let token = token_mock(&server);
        let offering = offering_mock(&server);
        let plan = plan_mock(&server);
        let instances = list_mock(
            &server,
            "/v1/service_instances",
            "service_plan_id eq 'plan-1'",
            json!({"num_items": 1, "items": [{
                "id": "inst-1",
                "name": "db1",
                "created_at": "2024-01-10T10:00:00Z",
                "updated_at": "2024-01-11T10:00:00Z",
                "ready": true,
                "usable": true
            }]}),
        );
        let bindings = list_mock(
            &server,
            "/v1/service_bindings",
            "service_instance_id eq 'inst-1'",
            json!({"num_items": 1, "items": [{"credentials": {
                "host": "h1.example.com",
                "port": "443",
                "schema": "SCHEMA_1",
                "user": "SCHEMA_1_RT",
                "password": "rt-pass",
                "hdi_user": "SCHEMA_1_DT",
                "hdi_password": "dt-pass",
                "certificate": "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n"
            }}]}),
        );

        let output = execute(&host, OutputFormat::SqlTools).unwrap();

        token.assert();
        offering.assert();
        plan.assert();
        instances.assert();
        bindings.assert();
        assert!(output.starts_with("\"sqltools.connections\": [{\"name\":\"svc:db1\""));
        assert!(output.contains("\"name\":\"svc:db1:OWNER\""));
        assert!(output.contains(
            "\"sslTrustStore\":\"-----BEGIN CERTIFICATE-----MIIB-----END CERTIFICATE-----\""
        ));
        assert!(output.ends_with("],\n"));
    }

    #[test]
    fn offering_not_found_is_reported_and_key_deleted() {
        let server = MockServer::start();
        let host = host(&server);
        let _token = token_mock(&server);
        let offering = list_mock(
            &server,
            "/v1/service_offerings",
            "catalog_name eq 'hana'",
            json!({"num_items": 0, "items": []}),
        );
        let plan = server.mock(|when, then| {
            when.path("/v1/service_plans");
            then.status(500);
        });

        let output = execute(&host, OutputFormat::Txt).unwrap();

        offering.assert();
        plan.assert_calls(0);
        assert_eq!(output, "Service offering not found: hana\n");
    }

    #[test]
    fn plan_not_found_is_reported_and_key_deleted() {
        let server = MockServer::start();
        let host = host(&server);
        let _token = token_mock(&server);
        let _offering = offering_mock(&server);
        let _plan = list_mock(
            &server,
            "/v1/service_plans",
            "catalog_name eq 'hdi-shared' and service_offering_id eq 'off-1'",
            json!({"num_items": 0}),
        );

        let output = execute(&host, OutputFormat::Json).unwrap();

        assert_eq!(output, "Service plan not found: hdi-shared\n");
    }

    #[test]
    fn key_is_deleted_when_the_api_fails() {
        let server = MockServer::start();
        let host = host(&server);
        let _token = token_mock(&server);
        let _offering = server.mock(|when, then| {
            when.path("/v1/service_offerings");
            then.status(503).body("unavailable");
        });

        let result = execute(&host, OutputFormat::Txt);

        assert_matches!(
            result,
            Err(Error::ServiceManager(ServiceManagerError::UnsuccessfulResponse { status: 503, .. }))
        );
    }

    #[test]
    fn key_is_deleted_when_authentication_fails() {
        let server = MockServer::start();
        let host = host(&server);
        let _token = server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(401).body("unauthorized");
        });

        assert_matches!(
            execute(&host, OutputFormat::Txt),
            Err(Error::Authenticate(_))
        );
    }

    #[test]
    fn missing_management_instance_creates_no_key() {
        let mut host = MockHostCli::new();
        host.expect_get_service().returning(|name| {
            Err(HostError::CommandFailed {
                command: format!("service {name} --guid"),
                status: "exit status: 1".into(),
                output: format!("Service instance {name} not found"),
            })
        });
        host.expect_create_service_key().never();
        host.expect_delete_service_key().never();

        assert_matches!(
            execute(&host, OutputFormat::Txt),
            Err(Error::Host(HostError::CommandFailed { .. }))
        );
    }

    #[test]
    fn failed_deletion_does_not_discard_the_listing() {
        let server = MockServer::start();
        let mut host = MockHostCli::new();
        let base_url = server.base_url();
        host.expect_get_service().returning(|_| Ok(()));
        host.expect_create_service_key().returning(|_, _| Ok(()));
        host.expect_service_key().returning(move |_, _| {
            Ok(vec![
                String::new(),
                String::new(),
                json!({"clientid": "c", "clientsecret": "s", "url": base_url, "sm_url": base_url})
                    .to_string(),
            ])
        });
        host.expect_delete_service_key().once().returning(|_, _| {
            Err(HostError::Spawn("cf".into(), "killed".into()))
        });
        let _token = token_mock(&server);
        let _offering = list_mock(
            &server,
            "/v1/service_offerings",
            "catalog_name eq 'hana'",
            json!({"num_items": 0}),
        );

        let output = execute(&host, OutputFormat::Txt).unwrap();

        assert_eq!(output, "Service offering not found: hana\n");
    }
}
