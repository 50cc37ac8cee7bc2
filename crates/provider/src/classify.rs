//! Boundary classifiers for raw provider failures
//!
//! The provider reports failures either as an HTTP status with a JSON body or,
//! for transport-level problems, as a bare message. These functions map both
//! onto `ErrorClassification` so nothing past the client needs to read prose.

use std::time::Duration;

use crate::ErrorClassification;

/// Message fragments that mark a failure as retryable on the same key.
///
/// Matched case-sensitively as substrings.
pub const TRANSIENT_SIGNATURES: &[&str] = &[
    "Rpc failed",
    "xhr error",
    "fetch failed",
    "500",
    "503",
    "error code: 6",
];

/// Provider phrase for a rejected key. Compared lowercase.
const INVALID_KEY_PATTERN: &str = "api key not valid";

/// Classify a bare error message.
///
/// Any known transient signature makes it `Transient`; everything else is
/// `Permanent`.
pub fn classify_message(message: &str) -> ErrorClassification {
    if TRANSIENT_SIGNATURES.iter().any(|sig| message.contains(sig)) {
        ErrorClassification::Transient
    } else {
        ErrorClassification::Permanent
    }
}

/// Classify an HTTP error response by status and body.
///
/// 408 and 500/502/503/504 are transient. 429 is rate limited, carrying the
/// `RetryInfo.retryDelay` hint from the body when present. Other 4xx are
/// permanent. Anything else falls back to `classify_message` on the body.
pub fn classify_status(status: u16, body: &str) -> ErrorClassification {
    match status {
        429 => ErrorClassification::RateLimited {
            retry_after: parse_retry_delay(body),
        },
        408 | 500 | 502 | 503 | 504 => ErrorClassification::Transient,
        400..=499 => ErrorClassification::Permanent,
        _ => classify_message(body),
    }
}

/// True when the message says the key itself was rejected.
pub fn is_invalid_key(message: &str) -> bool {
    message.to_lowercase().contains(INVALID_KEY_PATTERN)
}

/// Extract the retry hint from a provider error body.
///
/// Looks for `error.details[].retryDelay` in the form `"17s"` or `"0.5s"`.
pub fn parse_retry_delay(body: &str) -> Option<Duration> {
    let root: serde_json::Value = serde_json::from_str(body).ok()?;
    let details = root.get("error")?.get("details")?.as_array()?;
    details
        .iter()
        .filter_map(|d| d.get("retryDelay").and_then(|v| v.as_str()))
        .find_map(parse_seconds)
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    let secs: f64 = raw.trim().strip_suffix('s')?.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}
