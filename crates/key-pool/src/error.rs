//! Terminal errors of an invocation

use provider::ErrorClassification;

/// How a whole invocation failed.
///
/// The first two variants are configuration problems the user fixes in key
/// settings; `Exhausted` is a transient or content problem worth retrying later.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    #[error("no API keys configured: add at least one key in the key settings")]
    NoCredentials,

    #[error("API key missing or invalid: open the key settings and enter a valid key")]
    InvalidCredentials,

    /// Every key and retry failed; carries the last provider message verbatim.
    #[error("{message}")]
    Exhausted {
        message: String,
        classification: ErrorClassification,
    },

    #[error("invocation cancelled")]
    Cancelled,
}

impl InvokeError {
    /// True when the user should be sent to key settings rather than shown a
    /// retryable error. A rate-limited exhaustion means every key is out of quota.
    pub fn needs_credentials(&self) -> bool {
        match self {
            InvokeError::NoCredentials | InvokeError::InvalidCredentials => true,
            InvokeError::Exhausted { classification, .. } => {
                matches!(classification, ErrorClassification::RateLimited { .. })
            }
            InvokeError::Cancelled => false,
        }
    }
}

/// Result alias for invocations.
pub type Result<T> = std::result::Result<T, InvokeError>;
