//! Layered error definitions
//!
//! Categorized by source: config / store / credential / remote

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Store Errors =====
    /// A staging or durable store operation failed
    #[error("store '{store}' error: {message}")]
    Store { store: String, message: String },

    // ===== Credential Errors =====
    /// No credential has been persisted yet
    #[error("credential '{key}' not found in bucket '{bucket}'")]
    CredentialMissing { bucket: String, key: String },

    /// Missing credential or rejected by the remote service
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    // ===== Remote Errors =====
    /// Request could not be delivered or the reply could not be decoded
    #[error("transport error calling '{endpoint}': {message}")]
    Transport { endpoint: String, message: String },

    /// Remote replied with a non-zero application status
    #[error("remote rejected request (status {status}): {message}")]
    Remote { status: i64, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create store error
    pub fn store(store: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            store: store.into(),
            message: message.into(),
        }
    }

    /// Create unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Whether this error belongs to the authorization category
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::CredentialMissing { .. }
        )
    }
}
