//! Retry ceiling and backoff schedule

use std::time::Duration;

use provider::ErrorClassification;

/// Per-key retry policy shared by the pooled and single-key invokers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per key, including the first
    pub max_attempts: u32,
    /// Delay unit; the wait after attempt `n` is `base_delay × n`
    pub base_delay: Duration,
    /// Longest provider retry hint worth waiting out on the same key.
    /// Zero (the default) sends every rate limit straight to the next key.
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_rate_limit_wait: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// Backoff after the 1-based `attempt` failed.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Delay before retrying the same key, or `None` to stop using this key.
    pub fn retry_delay(&self, classification: ErrorClassification, attempt: u32) -> Option<Duration> {
        match classification {
            ErrorClassification::Transient => Some(self.delay_for(attempt)),
            ErrorClassification::RateLimited {
                retry_after: Some(hint),
            } if !self.max_rate_limit_wait.is_zero() && hint <= self.max_rate_limit_wait => {
                Some(hint.max(self.delay_for(attempt)))
            }
            ErrorClassification::RateLimited { .. } | ErrorClassification::Permanent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn backoff_strictly_increases() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(250),
            ..RetryPolicy::default()
        };
        for attempt in 1..10 {
            assert!(
                policy.delay_for(attempt) < policy.delay_for(attempt + 1),
                "attempt {attempt}"
            );
        }
    }

    #[test]
    fn permanent_never_retries() {
        assert_eq!(
            RetryPolicy::default().retry_delay(ErrorClassification::Permanent, 1),
            None
        );
    }

    fn waiting_policy() -> RetryPolicy {
        RetryPolicy {
            max_rate_limit_wait: Duration::from_secs(30),
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn rate_limit_moves_on_by_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_rate_limit_wait, Duration::ZERO);
        for hint in [None, Some(Duration::ZERO), Some(Duration::from_secs(17))] {
            assert_eq!(
                policy.retry_delay(ErrorClassification::RateLimited { retry_after: hint }, 1),
                None,
                "hint: {hint:?}"
            );
        }
    }

    #[test]
    fn short_rate_limit_hint_is_honored_when_enabled() {
        let delay = waiting_policy().retry_delay(
            ErrorClassification::RateLimited {
                retry_after: Some(Duration::from_secs(10)),
            },
            1,
        );
        assert_eq!(delay, Some(Duration::from_secs(10)));
    }

    #[test]
    fn rate_limit_hint_never_undercuts_backoff() {
        let delay = waiting_policy().retry_delay(
            ErrorClassification::RateLimited {
                retry_after: Some(Duration::from_millis(100)),
            },
            2,
        );
        assert_eq!(delay, Some(Duration::from_secs(4)));
    }

    #[test]
    fn long_or_missing_rate_limit_hint_moves_on() {
        let policy = waiting_policy();
        assert_eq!(
            policy.retry_delay(
                ErrorClassification::RateLimited {
                    retry_after: Some(Duration::from_secs(3600)),
                },
                1,
            ),
            None
        );
        assert_eq!(
            policy.retry_delay(ErrorClassification::RateLimited { retry_after: None }, 1),
            None
        );
    }
}
