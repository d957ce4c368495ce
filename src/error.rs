//! Error types shared across the crate

use thiserror::Error;

/// Errors raised by cache entries and the registry
#[derive(Debug, Error)]
pub enum CacheError {
    /// A required identifying field was missing or empty
    #[error("validation error: {0}")]
    Validation(String),

    /// Directory creation/validation, file write, or file delete failure
    #[error("file operation error: {0}")]
    FileOperation(String),

    /// Corrupt on-disk record, or a failed compression/serialization round trip
    #[error("serialization error: {0}")]
    Serialization(String),
}
