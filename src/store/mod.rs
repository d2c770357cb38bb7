//! Single-slot outcome storage.
//!
//! Each [`Outcome`] names one slot holding the latest XML document written to
//! it. Writes overwrite; there is no history.

pub mod file;
pub mod memory;

use std::fmt;

use async_trait::async_trait;

use crate::error::RelayError;

pub use file::FileOutcomeStore;
pub use memory::InMemoryOutcomeStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest-writer slot storage keyed by outcome.
///
/// Implementations must serialize concurrent writers to the same slot so a
/// slot never holds an interleaving of two documents.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Replace the content of `outcome`'s slot.
    async fn write(&self, outcome: Outcome, xml: &[u8]) -> Result<(), RelayError>;

    /// Current content of `outcome`'s slot, `None` if never written.
    async fn read(&self, outcome: Outcome) -> Result<Option<Vec<u8>>, RelayError>;

    async fn write_success(&self, xml: &[u8]) -> Result<(), RelayError> {
        self.write(Outcome::Success, xml).await
    }

    async fn write_failure(&self, xml: &[u8]) -> Result<(), RelayError> {
        self.write(Outcome::Failure, xml).await
    }
}
