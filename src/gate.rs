//! Credential verification gate.
//!
//! With the default [`ReferencePolicy::EchoInbound`] the gate hashes the
//! inbound credential and verifies that same credential against the fresh
//! hash. Nothing is pre-registered, so this only fails when hashing itself
//! fails. [`ReferencePolicy::Registered`] checks against a hash supplied up
//! front instead and must be opted into explicitly.

use tracing::debug;

use crate::crypto::credential::{HashedCredential, hash_credential, verify_credential};
use crate::error::RelayError;
use crate::store::Outcome;

/// Where the reference hash comes from.
#[derive(Debug, Clone, Default)]
pub enum ReferencePolicy {
    /// Hash the inbound credential on every request and verify against it.
    #[default]
    EchoInbound,
    /// Verify against a previously registered hash.
    Registered(HashedCredential),
}

/// Binary verification result. Never persisted, never returned to the originator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    NotVerified,
}

impl VerificationOutcome {
    /// Slot the message is filed to.
    pub fn destination(self) -> Outcome {
        match self {
            VerificationOutcome::Verified => Outcome::Success,
            VerificationOutcome::NotVerified => Outcome::Failure,
        }
    }
}

impl From<bool> for VerificationOutcome {
    fn from(matched: bool) -> Self {
        if matched {
            VerificationOutcome::Verified
        } else {
            VerificationOutcome::NotVerified
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerificationGate {
    policy: ReferencePolicy,
}

impl VerificationGate {
    pub fn new(policy: ReferencePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ReferencePolicy {
        &self.policy
    }

    /// Evaluate a credential.
    ///
    /// Argon2 is CPU bound, so hashing and verification run on the blocking
    /// thread pool. Fails with `Hashing` when the reference hash cannot be
    /// computed and with `Verification` when the reference hash is malformed.
    pub async fn evaluate(&self, credential: &str) -> Result<VerificationOutcome, RelayError> {
        let policy = self.policy.clone();
        let credential = credential.to_owned();
        tokio::task::spawn_blocking(move || evaluate_blocking(&policy, &credential))
            .await
            .map_err(|e| RelayError::Hashing(format!("task join: {e}")))?
    }
}

fn evaluate_blocking(
    policy: &ReferencePolicy,
    credential: &str,
) -> Result<VerificationOutcome, RelayError> {
    let reference = match policy {
        ReferencePolicy::EchoInbound => hash_credential(credential)?,
        ReferencePolicy::Registered(hashed) => hashed.clone(),
    };

    let outcome = VerificationOutcome::from(verify_credential(credential, &reference)?);
    debug!(?outcome, "credential evaluated");
    Ok(outcome)
}
