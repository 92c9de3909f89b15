//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Remote endpoint cannot be used
    #[error("invalid remote endpoint '{endpoint}': {message}")]
    InvalidEndpoint { endpoint: String, message: String },

    /// Store, credential or remote failure (passed through as is)
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl DispatcherError {
    /// Create an invalid endpoint error
    pub fn invalid_endpoint(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Whether the run failed for lack of a valid credential
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Contract(e) if e.is_authorization())
    }
}

/// Dispatcher Result type
pub type Result<T> = std::result::Result<T, DispatcherError>;
