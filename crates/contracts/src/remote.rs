//! RemoteEndpoint trait - the collection service as seen by the relay

use serde::{Deserialize, Serialize};

use crate::{Batch, ContractError, Credential};

/// Path of the credential endpoint, relative to the remote host
pub const CREDENTIALS_PATH: &str = "push/credentials";

/// Path of the batch submission endpoint, relative to the remote host
pub const SENSOR_GRID_PATH: &str = "push/sensor_grid";

/// Credential grant carried by the credential endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialGrant {
    #[serde(default)]
    pub key: Option<String>,
}

/// Reply of `GET /push/credentials`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEnvelope {
    #[serde(default)]
    pub data: Option<CredentialGrant>,
}

impl CredentialEnvelope {
    /// Envelope granting `key`
    pub fn granted(key: impl Into<String>) -> Self {
        Self {
            data: Some(CredentialGrant {
                key: Some(key.into()),
            }),
        }
    }

    /// Granted key, if present and non-empty
    pub fn key(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|grant| grant.key.as_deref())
            .filter(|key| !key.is_empty())
    }
}

/// Reply of `POST /push/sensor_grid`
///
/// A non-zero `status` is an application-level rejection described by `error`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushAck {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub error: String,
}

impl PushAck {
    /// Accepted submission
    pub fn ok() -> Self {
        Self::default()
    }

    /// Rejected submission
    pub fn rejected(status: i64, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

/// Remote collection service
#[trait_variant::make(RemoteEndpoint: Send)]
pub trait LocalRemoteEndpoint {
    /// Base address (used for logging/errors)
    fn endpoint(&self) -> &str;

    /// Ask the service for a fresh credential
    async fn fetch_credentials(&self) -> Result<CredentialEnvelope, ContractError>;

    /// Submit batches, authorized by `credential`
    async fn push_sensor_grids(
        &self,
        credential: &Credential,
        batches: &[Batch],
    ) -> Result<PushAck, ContractError>;
}
