//! Receiver side of the relay: the `POST /receive` endpoint.
//!
//! Processing order for one request: read the body, decode the transport
//! payload, re-encode the envelope as XML, evaluate the credential, then file
//! the XML to exactly one outcome slot. Any error aborts the request before a
//! slot is written.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use tracing::{debug, info, warn};

use crate::client::REQUEST_ID_HEADER;
use crate::codec;
use crate::config::{RECEIVE_PATH, ReceiverConfig};
use crate::error::RelayError;
use crate::gate::VerificationGate;
use crate::model::TransportPayload;
use crate::store::{FileOutcomeStore, Outcome, OutcomeStore};

/// Shared by every request. The outcome store is the only mutable state.
#[derive(Clone)]
pub struct ReceiverState {
    gate: Arc<VerificationGate>,
    store: Arc<dyn OutcomeStore>,
}

impl ReceiverState {
    pub fn new(gate: VerificationGate, store: Arc<dyn OutcomeStore>) -> Self {
        Self {
            gate: Arc::new(gate),
            store,
        }
    }

    /// File-backed state using the configured outcome paths and reference policy.
    pub fn from_config(config: ReceiverConfig) -> Self {
        let store = FileOutcomeStore::new(config.success_path, config.failure_path);
        Self::new(VerificationGate::new(config.reference), Arc::new(store))
    }

    pub fn store(&self) -> &Arc<dyn OutcomeStore> {
        &self.store
    }
}

/// Router exposing the receive endpoint. Binding and serving are left to the caller.
pub fn router(state: ReceiverState) -> Router {
    Router::new()
        .route(RECEIVE_PATH, post(receive))
        .with_state(state)
}

async fn receive(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<StatusCode, RelayError> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    let result = match body {
        Ok(body) => {
            debug!(request_id, bytes = body.len(), "payment query received");
            process(&state, &body).await
        }
        Err(rejection) => Err(RelayError::BodyRead(rejection.body_text())),
    };

    match result {
        Ok(_) => Ok(StatusCode::OK),
        Err(e) => {
            warn!(request_id, status = %e.status_code(), error = %e, "payment query rejected");
            Err(e)
        }
    }
}

/// Handle one transport payload body and return the slot it was filed to.
pub async fn process(state: &ReceiverState, body: &[u8]) -> Result<Outcome, RelayError> {
    let payload: TransportPayload =
        serde_json::from_slice(body).map_err(RelayError::PayloadDecode)?;
    let xml = codec::encode(&payload.envelope)?;

    let verification = state.gate.evaluate(&payload.credential).await?;
    let outcome = verification.destination();
    state.store.write(outcome, &xml).await?;

    info!(
        %outcome,
        transaction_id = %payload.envelope.message().transaction_id,
        "payment query filed"
    );
    Ok(outcome)
}
