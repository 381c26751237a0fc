//! Error types for the synchronization layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Sync Error Enum ==
/// Unified error type for controllers, mutations and the remote API.
///
/// Errors are `Clone` so the most recent one can live inside a controller's
/// published state next to the last-known-good data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    /// The request was superseded or its owner was torn down
    #[error("Request cancelled")]
    Cancelled,

    /// Transport-level failure (connect, timeout, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The analysis service answered with a non-success status
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A ticker could not be canonicalized
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The service accepted the request but reported `success: false`
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The symbol is already present in the watchlist
    #[error("Already in watchlist: {0}")]
    Duplicate(String),
}

impl SyncError {
    // == Classification ==
    /// Returns true for cancellations, which are never shown to the user.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, SyncError::Cancelled)
    }
}

// == Conversions ==
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SyncError::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the synchronization layer.
pub type Result<T> = std::result::Result<T, SyncError>;
