use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Outcome, OutcomeStore};
use crate::error::RelayError;

/// In-memory slots, for tests and embedders that persist elsewhere.
#[derive(Default)]
pub struct InMemoryOutcomeStore {
    slots: RwLock<HashMap<Outcome, Vec<u8>>>,
}

impl InMemoryOutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots holding a document.
    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[async_trait]
impl OutcomeStore for InMemoryOutcomeStore {
    async fn write(&self, outcome: Outcome, xml: &[u8]) -> Result<(), RelayError> {
        self.slots.write().await.insert(outcome, xml.to_vec());
        Ok(())
    }

    async fn read(&self, outcome: Outcome) -> Result<Option<Vec<u8>>, RelayError> {
        Ok(self.slots.read().await.get(&outcome).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_store_is_empty() {
        let store = InMemoryOutcomeStore::new();
        assert!(store.is_empty().await);
        assert!(store.read(Outcome::Success).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let store = InMemoryOutcomeStore::new();
        store.write_success(b"<ok/>").await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.read(Outcome::Failure).await.unwrap().is_none());

        store.write_failure(b"<failed/>").await.unwrap();
        assert_eq!(store.len().await, 2);
        assert_eq!(store.read(Outcome::Success).await.unwrap().unwrap(), b"<ok/>");
    }

    #[tokio::test]
    async fn test_write_replaces_previous() {
        let store = InMemoryOutcomeStore::new();
        store.write(Outcome::Failure, b"<a/>").await.unwrap();
        store.write(Outcome::Failure, b"<b/>").await.unwrap();
        assert_eq!(store.len().await, 1);
        assert_eq!(store.read(Outcome::Failure).await.unwrap().unwrap(), b"<b/>");
    }
}
