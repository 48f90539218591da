//! Error types for the state core.

use crate::api::Collection;
use thiserror::Error;

/// Main error type for store and loader operations.
///
/// There is no fatal class here: fetch errors surface to the load caller
/// with already-committed state left intact, and persistence errors are
/// recovered at the store boundary with a logged warning.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch failed for {collection}: {message}")]
    Fetch {
        collection: Collection,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid state path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    /// Wrap any displayable failure as a fetch error for `collection`.
    pub fn fetch(collection: Collection, message: impl Into<String>) -> Self {
        StoreError::Fetch {
            collection,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
