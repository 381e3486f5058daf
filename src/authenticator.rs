use std::fmt;

use base64::{Engine, engine::general_purpose};
use http::{
    HeaderValue, Method, StatusCode, Uri,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::http_client::HttpClient;
use crate::token::{Token, TokenType};

pub type ClientID = String;

#[derive(Error, Debug)]
pub enum AuthenticateError {
    #[error("invalid token endpoint `{0}`: `{1}`")]
    InvalidEndpoint(String, String),
    #[error("unable to build request: `{0}`")]
    RequestError(String),
    #[error("unable to deserialize token: `{0}`")]
    DeserializeError(String),
    #[error("token issuer error: Status code: `{0}`, Reason: `{1}`")]
    HttpResponseError(u16, String),
    #[error("http transport error: `{0}`")]
    HttpTransportError(String),
}

#[derive(Clone, PartialEq, Deserialize)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl<S: AsRef<str>> From<S> for ClientSecret {
    fn from(secret: S) -> Self {
        ClientSecret(secret.as_ref().to_string())
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientSecret: redacted")
    }
}

/// Client id and secret pair exchanged for an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientCredentials {
    client_id: ClientID,
    client_secret: ClientSecret,
}

impl ClientCredentials {
    pub fn new(client_id: ClientID, client_secret: ClientSecret) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &ClientSecret {
        &self.client_secret
    }

    fn basic_authorization(&self) -> Result<HeaderValue, AuthenticateError> {
        let encoded = general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.client_id,
            self.client_secret.expose()
        ));
        let mut value = HeaderValue::from_str(&format!("Basic {encoded}")).map_err(|_| {
            AuthenticateError::RequestError(
                "invalid HTTP header value set for Authorization".to_string(),
            )
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

pub trait Authenticator {
    fn authenticate(&self, credentials: &ClientCredentials) -> Result<Token, AuthenticateError>;
}

/// Obtains access tokens through the OAuth2 client credentials grant.
pub struct HttpAuthenticator<'a, C: HttpClient> {
    http_client: &'a C,
    token_endpoint: Uri,
}

impl<'a, C: HttpClient> HttpAuthenticator<'a, C> {
    pub fn new(http_client: &'a C, token_endpoint: Uri) -> Self {
        Self {
            http_client,
            token_endpoint,
        }
    }

    /// Targets the `/oauth/token` endpoint of the issuer at `issuer_url`.
    pub fn for_issuer(http_client: &'a C, issuer_url: &Url) -> Result<Self, AuthenticateError> {
        let endpoint = format!(
            "{}/oauth/token?grant_type=client_credentials",
            issuer_url.as_str().trim_end_matches('/')
        );
        let token_endpoint = Uri::try_from(endpoint.as_str())
            .map_err(|e| AuthenticateError::InvalidEndpoint(endpoint.clone(), e.to_string()))?;

        Ok(Self::new(http_client, token_endpoint))
    }
}

impl<C: HttpClient> Authenticator for HttpAuthenticator<'_, C> {
    /// Executes a POST request with the credentials as basic authentication and decodes the
    /// returned access token.
    fn authenticate(&self, credentials: &ClientCredentials) -> Result<Token, AuthenticateError> {
        let request = http::Request::builder()
            .uri(&self.token_endpoint)
            .method(Method::POST)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, credentials.basic_authorization()?)
            .body(Vec::new())
            .map_err(|e| AuthenticateError::RequestError(e.to_string()))?;

        debug!(client_id = credentials.client_id(), "requesting access token");
        let response = self
            .http_client
            .send(request)
            .map_err(|e| AuthenticateError::HttpTransportError(e.to_string()))?;

        let body = response.body();
        if response.status() != StatusCode::OK {
            return Err(AuthenticateError::HttpResponseError(
                response.status().as_u16(),
                String::from_utf8_lossy(body).to_string(),
            ));
        }

        let token_response: TokenRetrievalResponse = serde_json::from_slice(body)
            .map_err(|e| AuthenticateError::DeserializeError(e.to_string()))?;
        let token = Token::from(token_response);
        debug!(expires_at = ?token.expires_at(), "access token retrieved");

        Ok(token)
    }
}

/// Response of the OAuth token endpoint. Only `access_token` is mandatory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TokenRetrievalResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// The lifetime in seconds of the access token.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// `token_type` and `expires_in` are informative only: unexpected values fall back to a bearer
/// token without expiration.
impl From<TokenRetrievalResponse> for Token {
    fn from(response: TokenRetrievalResponse) -> Self {
        let token_type = match response.token_type.as_deref().map(TokenType::try_from) {
            Some(Ok(token_type)) => token_type,
            Some(Err(err)) => {
                warn!("{err}, using {}", TokenType::Bearer);
                TokenType::Bearer
            }
            None => TokenType::Bearer,
        };

        let Some(expires_in) = response.expires_in else {
            return Token::new(response.access_token, token_type, None);
        };
        match Token::expiring_in(response.access_token.clone(), token_type.clone(), expires_in) {
            Ok(token) => token,
            Err(err) => {
                warn!(expires_in, "ignoring token expiration: {err}");
                Token::new(response.access_token, token_type, None)
            }
        }
    }
}
