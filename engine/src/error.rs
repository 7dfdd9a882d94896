//! Error types for the Basket engine.

use crate::CollectionKind;
use thiserror::Error;

/// Errors returned to callers of collection operations.
///
/// Remote failures are not part of this type: add, remove and quantity
/// updates degrade to local-only changes instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("product id must not be empty")]
    InvalidProductId,

    #[error("invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(i64),

    // State errors
    #[error("malformed persisted state: {0}")]
    MalformedState(String),

    #[error("local storage error: {0}")]
    Storage(String),
}

/// Failure of a call to the remote collection gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote request timed out")]
    Timeout,

    #[error("failed to decode remote response: {0}")]
    Decode(String),

    #[error("{operation} is not supported for the {kind}")]
    Unsupported {
        kind: CollectionKind,
        operation: &'static str,
    },
}

impl RemoteError {
    /// Whether the server answered with the given HTTP status.
    pub fn is_status(&self, code: u16) -> bool {
        matches!(self, RemoteError::Status { status, .. } if *status == code)
    }
}

/// Checkout failures. These are always surfaced: checkout has no offline
/// meaning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("checkout requires a signed-in account")]
    NotAuthenticated,

    #[error("checkout rejected: {0}")]
    Remote(#[from] RemoteError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for gateway calls.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
