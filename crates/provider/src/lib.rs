//! Error taxonomy for calls into the generative-AI provider
//!
//! Every operation the invoker runs reports failure as a `ProviderError` whose
//! `ErrorClassification` decides what happens next:
//! - Transient retries the same key after a backoff
//! - RateLimited retries the same key when the provider gave a short retry hint,
//!   otherwise moves on to the next key
//! - Permanent moves on to the next key immediately
//!
//! Raw provider failures (HTTP status + body, transport error text) are turned
//! into a classification once, at the boundary, by the functions in `classify`.

pub mod classify;
pub mod message;

pub use classify::{
    TRANSIENT_SIGNATURES, classify_message, classify_status, is_invalid_key, parse_retry_delay,
};
pub use message::{error_message, error_message_from_body};

use std::time::Duration;

/// Classification of provider errors to determine retry/failover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    /// Retryable on the same key (network failures, 5xx)
    Transient,
    /// Rate limit or quota hit on this key, with the provider's retry hint if any
    RateLimited { retry_after: Option<Duration> },
    /// Will not succeed by retrying this key (bad request, invalid key, refusal)
    Permanent,
}

impl ErrorClassification {
    /// Label for logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorClassification::Transient => "transient",
            ErrorClassification::RateLimited { .. } => "rate_limited",
            ErrorClassification::Permanent => "permanent",
        }
    }
}

/// A failed attempt of one provider operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub classification: ErrorClassification,
    pub message: String,
    /// HTTP status, when the failure came from an HTTP response
    pub status: Option<u16>,
}

impl ProviderError {
    pub fn new(classification: ErrorClassification, message: impl Into<String>) -> Self {
        Self {
            classification,
            message: message.into(),
            status: None,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorClassification::Transient, message)
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::new(ErrorClassification::Permanent, message)
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::new(ErrorClassification::RateLimited { retry_after }, message)
    }

    /// Classify a raw error message by its known transient signatures.
    ///
    /// Only for failures that arrive as bare text (transport errors, SDK
    /// messages). HTTP responses should go through `classify_status`.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(classify_message(&message), message)
    }

    /// Attach the HTTP status that produced this error.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_transient(&self) -> bool {
        self.classification == ErrorClassification::Transient
    }
}

/// Result alias for a single provider attempt.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_message_classifies_transient_signature() {
        let err = ProviderError::from_message("TypeError: fetch failed");
        assert_eq!(err.classification, ErrorClassification::Transient);
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "TypeError: fetch failed");
    }

    #[test]
    fn from_message_defaults_to_permanent() {
        let err = ProviderError::from_message("[400] [INVALID_ARGUMENT] bad prompt");
        assert_eq!(err.classification, ErrorClassification::Permanent);
    }

    #[test]
    fn with_status_records_http_status() {
        let err = ProviderError::transient("[503] overloaded").with_status(503);
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(ErrorClassification::Transient.label(), "transient");
        assert_eq!(
            ErrorClassification::RateLimited { retry_after: None }.label(),
            "rate_limited"
        );
        assert_eq!(ErrorClassification::Permanent.label(), "permanent");
    }
}
