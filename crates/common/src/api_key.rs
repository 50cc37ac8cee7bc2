//! API key wrapper - redacted in Debug/Display/logs

use std::fmt;
use zeroize::Zeroize;

/// Number of leading characters shown by [`ApiKey::masked`].
const MASK_PREFIX_CHARS: usize = 5;

/// A single provider API key.
///
/// The raw value never appears in `Debug` or `Display` output and is wiped
/// from memory on drop. Use [`ApiKey::masked`] when a key must be identified
/// in logs.
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Surrounding whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> Self {
        let mut raw: String = value.into();
        let trimmed = raw.trim().to_owned();
        raw.zeroize();
        Self(trimmed)
    }

    /// Expose the raw key (use only when building a request)
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the key is empty. Blank keys are skipped by the invoker.
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }

    /// First few characters followed by `...`, for log correlation.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(MASK_PREFIX_CHARS).collect();
        format!("{prefix}...")
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self.masked())
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for ApiKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl PartialEq for ApiKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for ApiKey {}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
