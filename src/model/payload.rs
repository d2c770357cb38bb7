use serde::{Deserialize, Serialize};

use super::envelope::Envelope;

/// JSON body exchanged between originator and receiver.
///
/// Exactly one envelope per payload. The credential travels in clear text
/// under the `c2BPaymentQueryResult` key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportPayload {
    #[serde(rename = "envelope", alias = "Envelope")]
    pub envelope: Envelope,
    #[serde(rename = "c2BPaymentQueryResult", alias = "C2BPaymentQueryResult")]
    pub credential: String,
}

impl TransportPayload {
    pub fn new(envelope: Envelope, credential: impl Into<String>) -> Self {
        Self {
            envelope,
            credential: credential.into(),
        }
    }
}

impl std::fmt::Debug for TransportPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportPayload")
            .field("envelope", &self.envelope)
            .field("credential", &"<redacted>")
            .finish()
    }
}
