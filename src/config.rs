use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::crypto::credential::HashedCredential;
use crate::error::RelayError;
use crate::gate::ReferencePolicy;

/// Path of the receiver's single endpoint.
pub const RECEIVE_PATH: &str = "/receive";

const DEFAULT_ENDPOINT: &str = "http://localhost:8080/receive";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SUCCESS_PATH: &str = "success.xml";
const DEFAULT_FAILURE_PATH: &str = "failed.xml";

pub struct OriginatorConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub http_client: Option<reqwest::Client>,
}

#[derive(Default)]
pub struct OriginatorConfigBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    http_client: Option<reqwest::Client>,
}

impl OriginatorConfig {
    pub fn builder() -> OriginatorConfigBuilder {
        OriginatorConfigBuilder::default()
    }
}

impl OriginatorConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn build(self) -> Result<OriginatorConfig, RelayError> {
        let raw = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&raw)
            .map_err(|e| RelayError::Config(format!("invalid endpoint {raw:?}: {e}")))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(RelayError::Config(format!(
                "endpoint must be http or https, got {}",
                endpoint.scheme()
            )));
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(RelayError::Config("timeout must be non-zero".into()));
        }

        Ok(OriginatorConfig {
            endpoint,
            timeout,
            http_client: self.http_client,
        })
    }
}

pub struct ReceiverConfig {
    pub success_path: PathBuf,
    pub failure_path: PathBuf,
    pub reference: ReferencePolicy,
}

#[derive(Default)]
pub struct ReceiverConfigBuilder {
    success_path: Option<PathBuf>,
    failure_path: Option<PathBuf>,
    registered_hash: Option<String>,
}

impl ReceiverConfig {
    pub fn builder() -> ReceiverConfigBuilder {
        ReceiverConfigBuilder::default()
    }
}

impl ReceiverConfigBuilder {
    pub fn success_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.success_path = Some(path.into());
        self
    }

    pub fn failure_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_path = Some(path.into());
        self
    }

    /// Verify inbound credentials against this PHC-encoded hash instead of
    /// hashing each inbound credential on the fly.
    pub fn registered_hash(mut self, encoded: impl Into<String>) -> Self {
        self.registered_hash = Some(encoded.into());
        self
    }

    pub fn build(self) -> Result<ReceiverConfig, RelayError> {
        let success_path = self
            .success_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SUCCESS_PATH));
        let failure_path = self
            .failure_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FAILURE_PATH));

        if success_path == failure_path {
            return Err(RelayError::Config(format!(
                "success and failure outcomes share one path: {}",
                success_path.display()
            )));
        }

        let reference = match self.registered_hash {
            Some(encoded) => ReferencePolicy::Registered(
                HashedCredential::parse(encoded)
                    .map_err(|e| RelayError::Config(format!("registered_hash: {e}")))?,
            ),
            None => ReferencePolicy::EchoInbound,
        };

        Ok(ReceiverConfig {
            success_path,
            failure_path,
            reference,
        })
    }
}
