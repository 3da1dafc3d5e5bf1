//! Error taxonomy for calls against the wallet API.

use thiserror::Error;

// Re-export ApiConfig from config module to avoid duplication
pub use crate::config::schema::ApiConfig;

/// Errors that can occur while talking to the wallet API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    /// Malformed or missing input, caught before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The call succeeded at the transport level but the payload is unusable.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Timeout, connection failure or a 5xx-class response.
    #[error("Transient network error{}: {message}", fmt_status(.status))]
    Transient { status: Option<u16>, message: String },

    /// The server rejected the request on its merits.
    #[error("Request rejected (status {status}): {message}")]
    PermanentRejection { status: u16, message: String },

    /// A looked-up resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller abandoned the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

impl WalletError {
    /// Upstream HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            WalletError::Transient { status, .. } => *status,
            WalletError::PermanentRejection { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this kind of failure may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::Transient { .. })
    }

    /// Build the error for a non-success HTTP status.
    ///
    /// 408, 429 and 5xx are transient; any other 4xx is a rejection.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            408 | 429 | 500..=599 => WalletError::Transient {
                status: Some(status),
                message,
            },
            400..=499 => WalletError::PermanentRejection { status, message },
            _ => WalletError::Protocol(format!("unexpected status {}: {}", status, message)),
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return WalletError::Protocol(format!("malformed response body: {}", e));
        }
        if e.is_builder() {
            return WalletError::Validation(format!("invalid request: {}", e));
        }
        WalletError::Transient {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Result type for wallet API operations.
pub type WalletResult<T> = Result<T, WalletError>;
