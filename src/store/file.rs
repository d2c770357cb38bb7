use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Outcome, OutcomeStore};
use crate::error::RelayError;

/// One file per outcome, overwritten on every write.
///
/// Each slot has its own mutex: writers to the same file are serialized,
/// writers to different files proceed independently.
pub struct FileOutcomeStore {
    success: Mutex<PathBuf>,
    failure: Mutex<PathBuf>,
}

impl FileOutcomeStore {
    pub fn new(success_path: impl Into<PathBuf>, failure_path: impl Into<PathBuf>) -> Self {
        Self {
            success: Mutex::new(success_path.into()),
            failure: Mutex::new(failure_path.into()),
        }
    }

    fn slot(&self, outcome: Outcome) -> &Mutex<PathBuf> {
        match outcome {
            Outcome::Success => &self.success,
            Outcome::Failure => &self.failure,
        }
    }

    pub async fn path(&self, outcome: Outcome) -> PathBuf {
        self.slot(outcome).lock().await.clone()
    }
}

#[async_trait]
impl OutcomeStore for FileOutcomeStore {
    async fn write(&self, outcome: Outcome, xml: &[u8]) -> Result<(), RelayError> {
        let path = self.slot(outcome).lock().await;
        tokio::fs::write(path.as_path(), xml)
            .await
            .map_err(|source| RelayError::Storage {
                slot: outcome.as_str(),
                source,
            })?;
        debug!(%outcome, path = %path.display(), bytes = xml.len(), "outcome written");
        Ok(())
    }

    async fn read(&self, outcome: Outcome) -> Result<Option<Vec<u8>>, RelayError> {
        let path = self.slot(outcome).lock().await;
        read_optional(&path).await.map_err(|source| RelayError::Storage {
            slot: outcome.as_str(),
            source,
        })
    }
}

async fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
