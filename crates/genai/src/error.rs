//! Error types for workflow operations

use key_pool::InvokeError;

/// Errors from studio workflows and video generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resilient invoker gave up (no keys, bad keys, or all attempts failed).
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// A long-running operation finished with an error payload.
    #[error("video generation error: {0}")]
    Operation(String),

    /// The provider reported success but the expected output was absent.
    #[error("missing output: {0}")]
    MissingOutput(String),
}

impl Error {
    /// True when the user should fix their keys rather than retry.
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Error::Invoke(e) if e.needs_credentials())
    }
}

/// Result alias for workflow operations.
pub type Result<T> = std::result::Result<T, Error>;
