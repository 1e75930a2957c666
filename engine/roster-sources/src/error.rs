//! Error types for roster acquisition

use thiserror::Error;

/// Result type alias for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors a source adapter (or one of its sub-units) can report.
///
/// None of these abort a pipeline run: the acquisition chain logs them and
/// moves on to the next provider.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Connection, timeout or body-read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Body was not the JSON shape the adapter expects
    #[error("malformed payload: {0}")]
    Payload(String),

    /// JSON decoding failed
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication with the provider failed and could not be refreshed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Every sub-unit (team, position bucket) of a fanned-out provider failed
    #[error("all {attempted} sub-units failed, last error: {last}")]
    AllSubUnitsFailed { attempted: usize, last: String },

    /// Adapter is not usable with the current configuration
    #[error("source not configured: {0}")]
    NotConfigured(String),
}

impl SourceError {
    /// Create a new payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// Whether retrying the same request might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Transport(_) => true,
            SourceError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
