pub mod authenticator;
pub mod commands;
pub mod host;
pub mod http;
pub mod http_client;
pub mod listing;
pub mod output;
pub mod parameters;
pub mod service_key;
pub mod service_manager;
pub mod token;

use thiserror::Error;

/// Failure of a run. Each variant comes from the seam that failed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("host cli: {0}")]
    Host(#[from] host::HostError),
    #[error("service key: {0}")]
    ServiceKey(#[from] service_key::ServiceKeyError),
    #[error("fetching access token: {0}")]
    Authenticate(#[from] authenticator::AuthenticateError),
    #[error("service manager: {0}")]
    ServiceManager(#[from] service_manager::error::ServiceManagerError),
    #[error("rendering output: {0}")]
    Render(#[from] output::RenderError),
    #[error("building http client: {0}")]
    HttpBuild(#[from] crate::http::client::HttpBuildError),
    #[error("proxy configuration: {0}")]
    Proxy(#[from] crate::http::config::ProxyError),
}
