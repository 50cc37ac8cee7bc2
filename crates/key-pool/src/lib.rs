//! Credential pool and resilient invoker for multi-key provider access
//!
//! Runs one logical provider operation against an ordered pool of API keys,
//! retrying transient failures on the same key and falling over to the next
//! key on anything else. The caller owns the pool and hands the invoker a
//! snapshot per call, so a settings change never disturbs a call in flight.
//!
//! Invocation lifecycle:
//! 1. Caller takes a `CredentialPool` snapshot from its `SharedPool`
//! 2. Empty or all-blank pool → `NoCredentials` before any network call
//! 3. Each usable key is tried up to `RetryPolicy::max_attempts` times
//! 4. Transient failure → sleep `base_delay × attempt`, retry the same key
//! 5. Permanent failure or rate limit → next key (a short rate-limit hint is
//!    waited out on the same key only when `max_rate_limit_wait` is set)
//! 6. Success → returned immediately; pool exhausted → one terminal `InvokeError`
//!
//! Every sleep and every operation await races a `CancellationToken`.

pub mod error;
pub mod invoker;
pub mod policy;
pub mod pool;

pub use error::{InvokeError, Result};
pub use invoker::Invoker;
pub use policy::RetryPolicy;
pub use pool::{CredentialPool, SharedPool};
pub use tokio_util::sync::CancellationToken;
