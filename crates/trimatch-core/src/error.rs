//! Error types for the trimatch-core library.
//!
//! These are genuine faults ("the match could not be computed"), kept
//! strictly separate from the business exceptions in [`crate::exceptions`],
//! which are ordinary values collected into a match result.

use thiserror::Error;

/// Main error type for the trimatch library.
#[derive(Error, Debug)]
pub enum MatchError {
    /// The match request itself is unusable.
    #[error("invalid match request: {0}")]
    InvalidRequest(String),

    /// A document is structurally broken beyond what the engine can score.
    #[error("malformed document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// I/O error (policy or request files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the trimatch library.
pub type Result<T> = std::result::Result<T, MatchError>;
