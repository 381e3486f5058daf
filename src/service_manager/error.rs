use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceManagerError {
    #[error("invalid endpoint `{0}`: `{1}`")]
    InvalidEndpoint(String, String),
    #[error("error building the request: `{0}`")]
    Request(String),
    #[error("transport error: `{0}`")]
    Transport(String),
    #[error("unsuccessful response from `{path}`: Status code: `{status}`, Body: `{body}`")]
    UnsuccessfulResponse {
        path: String,
        status: u16,
        body: String,
    },
    #[error("error decoding the response payload from `{0}`: `{1}`")]
    Decoder(String, String),
    #[error("`{0}` reported {1} matching items but returned none")]
    MissingItem(String, i64),
}
