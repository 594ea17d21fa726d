//! Error types for policy generation

use thiserror::Error;

/// Error type for policy generation
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    /// The model backend failed; carries the backend's message
    #[error("Model backend failure: {0}")]
    Backend(String),

    /// The backend replied, but not with a parseable policy
    #[error("Malformed policy reply: {0}")]
    MalformedReply(String),
}
