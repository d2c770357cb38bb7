use std::error::Error as _;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::OriginatorConfig;
use crate::error::RelayError;
use crate::model::{Envelope, TransportPayload};

/// Correlation header attached to every send. Carries no protocol meaning.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Result of one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportResult {
    /// The receiver answered `200 OK`.
    Acknowledged,
    /// The receiver answered with any other status. The body is discarded.
    Rejected(StatusCode),
    /// The request never completed: connect failure, I/O error or timeout.
    Unreachable(String),
}

impl TransportResult {
    pub fn is_acknowledged(&self) -> bool {
        matches!(self, TransportResult::Acknowledged)
    }

    /// Convert the non-acknowledged variants into errors for `?` callers.
    pub fn into_result(self) -> Result<(), RelayError> {
        match self {
            TransportResult::Acknowledged => Ok(()),
            TransportResult::Rejected(status) => Err(RelayError::Rejected(status)),
            TransportResult::Unreachable(cause) => Err(RelayError::Unreachable(cause)),
        }
    }
}

/// Originator side of the relay: wraps an envelope and a credential into a
/// transport payload and posts it once to the receiver.
///
/// There is no retry. A failed attempt is reported to the caller as is.
pub struct OriginatorClient {
    config: OriginatorConfig,
    http: reqwest::Client,
}

impl OriginatorClient {
    pub fn new(config: OriginatorConfig) -> Self {
        let http = config.http_client.clone().unwrap_or_default();
        Self { config, http }
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.config.endpoint
    }

    /// Send one envelope with its credential.
    ///
    /// `Err` means nothing was put on the wire; every outcome of the network
    /// attempt itself is a [`TransportResult`].
    pub async fn send(
        &self,
        envelope: &Envelope,
        credential: &str,
    ) -> Result<TransportResult, RelayError> {
        let payload = TransportPayload::new(envelope.clone(), credential);
        let body = serde_json::to_vec(&payload).map_err(RelayError::PayloadEncode)?;
        Ok(self.post(body).await)
    }

    /// Decode an XML payment-query document and send it.
    pub async fn send_xml(
        &self,
        xml: &[u8],
        credential: &str,
    ) -> Result<TransportResult, RelayError> {
        let envelope = codec::decode(xml)?;
        self.send(&envelope, credential).await
    }

    async fn post(&self, body: Vec<u8>) -> TransportResult {
        let request_id = uuid::Uuid::new_v4().to_string();
        let endpoint = self.config.endpoint.as_str();
        debug!(endpoint, request_id, bytes = body.len(), "sending payment query");

        let sent = self
            .http
            .post(self.config.endpoint.clone())
            .timeout(self.config.timeout)
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, &request_id)
            .body(body)
            .send()
            .await;

        match sent {
            Ok(resp) if resp.status() == StatusCode::OK => {
                info!(endpoint, request_id, "receiver acknowledged");
                TransportResult::Acknowledged
            }
            Ok(resp) => {
                let status = resp.status();
                warn!(endpoint, request_id, %status, "receiver failed to acknowledge");
                TransportResult::Rejected(status)
            }
            Err(e) => {
                let cause = if e.is_timeout() {
                    format!("request timed out after {:?}", self.config.timeout)
                } else {
                    error_chain(&e)
                };
                warn!(endpoint, request_id, cause, "receiver unreachable");
                TransportResult::Unreachable(cause)
            }
        }
    }
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
