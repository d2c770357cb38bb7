use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("error decoding XML envelope: {0}")]
    MalformedXml(String),

    #[error("error marshalling transport payload: {0}")]
    PayloadEncode(#[source] serde_json::Error),

    #[error("error unmarshalling transport payload: {0}")]
    PayloadDecode(#[source] serde_json::Error),

    #[error("error reading request body: {0}")]
    BodyRead(String),

    #[error("error hashing credential: {0}")]
    Hashing(String),

    #[error("error verifying credential: {0}")]
    Verification(String),

    #[error("error writing {slot} outcome: {source}")]
    Storage {
        slot: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("receiver unreachable: {0}")]
    Unreachable(String),

    #[error("receiver failed to acknowledge: status={0}")]
    Rejected(StatusCode),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// HTTP status the receiver answers with when this error aborts a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            RelayError::Verification(_) => StatusCode::UNAUTHORIZED,
            RelayError::Rejected(status) => *status,
            RelayError::MalformedXml(_)
            | RelayError::PayloadEncode(_)
            | RelayError::PayloadDecode(_)
            | RelayError::Hashing(_)
            | RelayError::Storage { .. }
            | RelayError::Unreachable(_)
            | RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("{self}\n")).into_response()
    }
}
