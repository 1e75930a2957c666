//! Error types for the artifact store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing artifacts
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O errors (file operations, renames, directory creation)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bincode serialization errors
    #[error("Bincode serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Artifact not found
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// A run directory that must be fresh already exists
    #[error("Artifact already exists: {0}")]
    AlreadyExists(String),

    /// Persisted pieces that do not belong together
    #[error("Artifact mismatch: {0}")]
    Mismatch(String),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::Mismatch(msg.into())
    }
}
