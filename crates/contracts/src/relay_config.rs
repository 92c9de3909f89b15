//! RelayConfig - Config Loader output
//!
//! Describes the remote collection service, the staging and durable stores,
//! the dispatch batch frequency and the cleanup policy.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::KeyScheme;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Remote collection service
    pub remote: RemoteConfig,

    /// Transient staging store
    #[serde(default)]
    pub staging: StagingConfig,

    /// Durable local store
    #[serde(default)]
    pub durable: DurableConfig,

    /// Batch dispatch
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Staged data cleanup
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

/// Remote collection service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL, e.g. "https://collector.example.org/"
    pub host: String,

    /// Authorization header presented when requesting a credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
}

/// Staging store: connection plus key naming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Connection URL (redis://, rediss:// or unix://)
    #[serde(default = "default_staging_url")]
    pub url: String,

    /// Key prefixes
    #[serde(flatten)]
    pub keys: KeyScheme,
}

fn default_staging_url() -> String {
    "redis://127.0.0.1:6379/".to_string()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            url: default_staging_url(),
            keys: KeyScheme::default(),
        }
    }
}

/// Durable store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DurableConfig {
    /// Database file path
    #[serde(default = "default_durable_path")]
    pub path: PathBuf,
}

fn default_durable_path() -> PathBuf {
    PathBuf::from("grid-relay.redb")
}

impl Default for DurableConfig {
    fn default() -> Self {
        Self {
            path: default_durable_path(),
        }
    }
}

/// Batch dispatch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Grids per outbound request; zero or negative sends a single request
    #[serde(default = "default_frequency")]
    pub frequency: i64,
}

fn default_frequency() -> i64 {
    10
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            frequency: default_frequency(),
        }
    }
}

impl DispatchConfig {
    /// Chunk size, or `None` when everything goes in one request
    pub fn chunk_size(&self) -> Option<usize> {
        usize::try_from(self.frequency).ok().filter(|n| *n > 0)
    }
}

/// Staged data cleanup
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CleanupConfig {
    #[serde(default)]
    pub policy: PurgePolicy,
}

/// Which store a cleanup run purges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurgePolicy {
    /// Delete grid and sensor keys from the staging store
    #[default]
    Transient,
    /// Delete every entry of the durable Sensors and Grids buckets
    DurableBuckets,
}

impl std::fmt::Display for PurgePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transient => f.write_str("transient"),
            Self::DurableBuckets => f.write_str("durable_buckets"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_size() {
        assert_eq!(DispatchConfig { frequency: 5 }.chunk_size(), Some(5));
        assert_eq!(DispatchConfig { frequency: 0 }.chunk_size(), None);
        assert_eq!(DispatchConfig { frequency: -3 }.chunk_size(), None);
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let config: RelayConfig =
            serde_json::from_str(r#"{"remote":{"host":"http://localhost/"}}"#).unwrap();
        assert_eq!(config.dispatch.frequency, 10);
        assert_eq!(config.staging.keys, KeyScheme::default());
        assert_eq!(config.cleanup.policy, PurgePolicy::Transient);
        assert!(config.remote.authorization.is_none());
    }

    #[test]
    fn test_purge_policy_names() {
        let policy: PurgePolicy = serde_json::from_str(r#""durable_buckets""#).unwrap();
        assert_eq!(policy, PurgePolicy::DurableBuckets);
        assert_eq!(policy.to_string(), "durable_buckets");
    }
}
