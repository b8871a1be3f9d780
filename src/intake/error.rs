//! Intake error types.

use thiserror::Error;

/// Errors resolving an image reference to bytes.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// No image stored under the given key.
    #[error("image not found: {storage_key}")]
    NotFound { storage_key: String },

    /// The image exists but could not be read.
    #[error("failed to read image '{storage_key}': {source}")]
    ReadFailed {
        storage_key: String,
        #[source]
        source: std::io::Error,
    },
}
