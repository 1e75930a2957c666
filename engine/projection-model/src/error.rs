//! Error types for model fitting and projection

use crate::model::ModelFamily;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Fit and load failures. Both are fatal for a run.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Not enough rows for the requested validation scheme
    #[error("need at least {required} rows, got {rows}")]
    InsufficientData { rows: usize, required: usize },

    /// Feature matrix and label vector (or a row) disagree in shape
    #[error("shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    /// Labels or features contain NaN or infinity
    #[error("non-finite value in {0}")]
    NonFinite(String),

    /// Hyperparameter outside its valid range
    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    /// A model family required by the ensemble is absent
    #[error("missing model family {0}")]
    MissingFamily(ModelFamily),

    /// Models from different training runs were mixed
    #[error("run mismatch: expected {expected}, found {found}")]
    RunMismatch { expected: Uuid, found: Uuid },

    /// Artifact was filed under one family but holds another
    #[error("family mismatch: expected {expected}, found {found}")]
    FamilyMismatch { expected: ModelFamily, found: ModelFamily },
}

impl ModelError {
    /// Create a new hyperparameter error
    pub fn hyperparameter(msg: impl Into<String>) -> Self {
        Self::InvalidHyperparameter(msg.into())
    }
}
