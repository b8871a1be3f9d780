//! Extraction provider error taxonomy.

use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the extraction provider.
///
/// None of these are retried by the state machine; retry is reserved for
/// extractable-but-unreadable fields, not provider failure.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider rate limited: {0}")]
    RateLimited(String),

    #[error("provider authentication failed: {0}")]
    Auth(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("provider transport error: {0}")]
    Transport(String),
}
