//! Error types for network setup and evaluation.

use thiserror::Error;

/// Errors surfaced by hidden-node resolution and the network pipeline.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Missing or invalid configuration, or an operation invoked out of order.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Any failure reported by a storage collaborator, propagated as-is.
    #[error("Storage fault: {0}")]
    Storage(#[from] anyhow::Error),
}

impl NetworkError {
    /// Create a Precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// True when the error came from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Result alias for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;
