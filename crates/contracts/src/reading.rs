//! Staged readings and the per-grid batch sent upstream.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field holding the reported value in a staged field map
pub const FIELD_VALUE: &str = "value";

/// Field holding the observation timestamp in a staged field map
pub const FIELD_DATE: &str = "date";

/// One node observation reported by a sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeReport {
    /// Node identifier within the grid
    pub node_id: String,
    /// Raw reported value
    pub value: String,
}

/// Payload submitted for one grid
///
/// Decoding is strict: unknown fields and non-string values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridPayload {
    /// Node reports, in submission order
    pub data: Vec<NodeReport>,
}

/// Latest observation of a node
///
/// On the wire the timestamp travels as `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub node_id: String,
    pub value: String,
    #[serde(rename = "date")]
    pub observed_at: String,
}

impl Reading {
    /// Create a reading
    pub fn new(
        node_id: impl Into<String>,
        value: impl Into<String>,
        observed_at: impl Into<String>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            value: value.into(),
            observed_at: observed_at.into(),
        }
    }

    /// Field map stored under the node's sensor key
    pub fn to_fields(&self) -> HashMap<String, String> {
        HashMap::from([
            (FIELD_VALUE.to_string(), self.value.clone()),
            (FIELD_DATE.to_string(), self.observed_at.clone()),
        ])
    }

    /// Rebuild a reading from a staged field map
    ///
    /// Missing fields read as empty strings, so a member without staged
    /// data still yields a reading with empty `value` and `date`.
    pub fn from_fields(node_id: impl Into<String>, fields: &HashMap<String, String>) -> Self {
        Self {
            node_id: node_id.into(),
            value: fields.get(FIELD_VALUE).cloned().unwrap_or_default(),
            observed_at: fields.get(FIELD_DATE).cloned().unwrap_or_default(),
        }
    }
}

/// Wire projection of one grid at dispatch time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Grid identifier, taken from the grid key
    pub client_id: String,
    /// Latest reading of every member node
    #[serde(rename = "data")]
    pub readings: Vec<Reading>,
}

impl Batch {
    /// Create an empty batch for a client
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            readings: Vec::new(),
        }
    }
}

/// Bearer credential presented on submission
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .finish()
    }
}
