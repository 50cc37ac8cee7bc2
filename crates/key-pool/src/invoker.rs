//! Resilient invocation of one provider operation across a key pool
//!
//! `invoke` walks the pool in order; `invoke_single` runs the same per-key
//! retry loop against one caller-supplied key with no failover. Both are
//! strictly sequential: one attempt in flight at a time, and the result is
//! produced only once the loop terminates.

use std::future::Future;

use common::ApiKey;
use provider::{ProviderError, is_invalid_key};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{InvokeError, Result};
use crate::policy::RetryPolicy;
use crate::pool::CredentialPool;

/// Why the per-key loop gave up on a key.
enum KeyFailure {
    Cancelled,
    Failed(ProviderError),
}

/// Runs provider operations with key failover and bounded retries.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
    policy: RetryPolicy,
}

impl Invoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` with keys from `pool` in order until one succeeds.
    ///
    /// Transient failures are retried on the same key with growing backoff up
    /// to `max_attempts`; any other failure moves straight to the next key.
    /// An empty or all-blank pool fails with `NoCredentials` without calling
    /// `op`. After the last key, a rejected-key message becomes
    /// `InvalidCredentials`; anything else is `Exhausted` with the last message.
    pub async fn invoke<T, F, Fut>(
        &self,
        pool: &CredentialPool,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut(ApiKey) -> Fut,
        Fut: Future<Output = provider::Result<T>>,
    {
        if pool.is_all_blank() {
            warn!(keys = pool.len(), "no usable API keys in pool");
            record_invocation("no_credentials");
            return Err(InvokeError::NoCredentials);
        }

        let mut last_error = None;
        for (position, key) in pool.usable().enumerate() {
            debug!(key = %key.masked(), position, "trying key");
            match self.run_key(key, cancel, &mut op).await {
                Ok(value) => {
                    record_invocation("success");
                    return Ok(value);
                }
                Err(KeyFailure::Cancelled) => {
                    info!(key = %key.masked(), "invocation cancelled");
                    record_invocation("cancelled");
                    return Err(InvokeError::Cancelled);
                }
                Err(KeyFailure::Failed(err)) => {
                    warn!(
                        key = %key.masked(),
                        classification = err.classification.label(),
                        error = %err,
                        "key failed, advancing to next key"
                    );
                    last_error = Some(err);
                }
            }
        }

        Err(exhausted(last_error))
    }

    /// Run `op` against one fixed key with the same retry policy.
    ///
    /// There is no failover: running out of attempts, or a non-retryable
    /// failure, ends the invocation.
    pub async fn invoke_single<T, F, Fut>(
        &self,
        key: &ApiKey,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T>
    where
        F: FnMut(ApiKey) -> Fut,
        Fut: Future<Output = provider::Result<T>>,
    {
        if key.is_blank() {
            record_invocation("no_credentials");
            return Err(InvokeError::NoCredentials);
        }

        match self.run_key(key, cancel, &mut op).await {
            Ok(value) => {
                record_invocation("success");
                Ok(value)
            }
            Err(KeyFailure::Cancelled) => {
                record_invocation("cancelled");
                Err(InvokeError::Cancelled)
            }
            Err(KeyFailure::Failed(err)) => {
                warn!(
                    key = %key.masked(),
                    classification = err.classification.label(),
                    error = %err,
                    "single-key operation failed"
                );
                Err(exhausted(Some(err)))
            }
        }
    }

    /// Attempt `op` on one key until success, a non-retryable failure, the
    /// attempt ceiling, or cancellation.
    async fn run_key<T, F, Fut>(
        &self,
        key: &ApiKey,
        cancel: &CancellationToken,
        op: &mut F,
    ) -> std::result::Result<T, KeyFailure>
    where
        F: FnMut(ApiKey) -> Fut,
        Fut: Future<Output = provider::Result<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(KeyFailure::Cancelled),
                outcome = op(key.clone()) => outcome,
            };

            let err = match outcome {
                Ok(value) => {
                    record_attempt("success");
                    return Ok(value);
                }
                Err(err) => err,
            };
            record_attempt(err.classification.label());

            let delay = match self.policy.retry_delay(err.classification, attempt) {
                Some(delay) if attempt < max_attempts => delay,
                _ => return Err(KeyFailure::Failed(err)),
            };

            warn!(
                key = %key.masked(),
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "retryable error, retrying same key"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(KeyFailure::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}

/// Fold the last per-key failure into the terminal error.
fn exhausted(last_error: Option<ProviderError>) -> InvokeError {
    match last_error {
        Some(err) if is_invalid_key(&err.message) => {
            record_invocation("invalid_credentials");
            InvokeError::InvalidCredentials
        }
        Some(err) => {
            record_invocation("exhausted");
            InvokeError::Exhausted {
                message: err.message,
                classification: err.classification,
            }
        }
        None => {
            record_invocation("no_credentials");
            InvokeError::NoCredentials
        }
    }
}

fn record_attempt(outcome: &'static str) {
    metrics::counter!("keyrelay_attempts_total", "outcome" => outcome).increment(1);
}

fn record_invocation(result: &'static str) {
    metrics::counter!("keyrelay_invocations_total", "result" => result).increment(1);
}
