//! Batch submission errors.

use thiserror::Error;

/// Rejections raised at submission time, before any work unit starts. No
/// partial batch is ever admitted.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("batch contains no label groups")]
    EmptyBatch,

    #[error("batch of {submitted} label groups exceeds the limit of {limit}")]
    BatchSizeExceeded { submitted: usize, limit: usize },

    #[error("label group '{label_id}' has {count} images; between 1 and 3 are required")]
    ImageCountOutOfRange { label_id: String, count: usize },
}
