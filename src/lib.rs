pub mod client;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod gate;
pub mod model;
pub mod receiver;
pub mod store;

pub use client::{OriginatorClient, TransportResult};
pub use config::{OriginatorConfig, OriginatorConfigBuilder, ReceiverConfig, ReceiverConfigBuilder};
pub use error::RelayError;
pub use gate::{ReferencePolicy, VerificationGate, VerificationOutcome};
pub use model::{Envelope, PaymentQueryMessage, TransportPayload};
pub use receiver::{ReceiverState, router};
pub use store::{Outcome, OutcomeStore};
