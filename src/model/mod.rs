pub mod envelope;
pub mod payload;

pub use envelope::{Body, Envelope, PaymentQueryMessage};
pub use payload::TransportPayload;
