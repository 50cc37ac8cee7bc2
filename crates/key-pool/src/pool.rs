//! Ordered API key pool and its session-owned holder
//!
//! `CredentialPool` is an immutable snapshot: order is preference order, and
//! the only way to change it is to build a new one. `SharedPool` holds the
//! current snapshot for a session and swaps it wholesale when settings change.
//! Invocations clone the snapshot up front and never see a later swap.

use std::fmt;
use std::sync::Arc;

use common::ApiKey;
use tokio::sync::RwLock;
use tracing::info;

/// Immutable, ordered set of API keys.
///
/// Blank entries are kept so that "every entry is blank" stays observable;
/// `usable()` skips them.
#[derive(Clone, Default)]
pub struct CredentialPool {
    keys: Arc<[ApiKey]>,
}

impl CredentialPool {
    /// Build a pool from keys in preference order.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<ApiKey>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Use `keys` when any were configured, otherwise a single-key pool from
    /// the environment fallback (which may itself be absent or blank).
    pub fn with_fallback(keys: Vec<String>, fallback: Option<String>) -> Self {
        if keys.is_empty() {
            Self::new(fallback)
        } else {
            Self::new(keys)
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True when there is no key worth trying (empty, or every entry blank).
    pub fn is_all_blank(&self) -> bool {
        self.keys.iter().all(ApiKey::is_blank)
    }

    /// Non-blank keys in pool order.
    pub fn usable(&self) -> impl Iterator<Item = &ApiKey> {
        self.keys.iter().filter(|k| !k.is_blank())
    }

    /// All entries, blank ones included.
    pub fn keys(&self) -> &[ApiKey] {
        &self.keys
    }

    /// Pool summary for status output. Keys appear only in masked form.
    pub fn summary(&self) -> serde_json::Value {
        let usable = self.usable().count();
        let status = if usable == 0 { "unconfigured" } else { "ready" };
        let keys: Vec<serde_json::Value> = self
            .keys
            .iter()
            .enumerate()
            .map(|(position, key)| {
                serde_json::json!({
                    "position": position,
                    "key": if key.is_blank() { String::new() } else { key.masked() },
                    "blank": key.is_blank(),
                })
            })
            .collect();

        serde_json::json!({
            "status": status,
            "keys_total": self.keys.len(),
            "keys_usable": usable,
            "keys": keys,
        })
    }
}

impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys.iter()).finish()
    }
}

/// Session-owned holder of the current pool.
pub struct SharedPool {
    current: RwLock<CredentialPool>,
}

impl SharedPool {
    pub fn new(pool: CredentialPool) -> Self {
        info!(
            keys = pool.len(),
            usable = pool.usable().count(),
            "credential pool initialized"
        );
        Self {
            current: RwLock::new(pool),
        }
    }

    /// The pool to hand to an invocation.
    pub async fn snapshot(&self) -> CredentialPool {
        self.current.read().await.clone()
    }

    /// Replace every key at once. Invocations already running keep their snapshot.
    pub async fn replace(&self, pool: CredentialPool) {
        let mut current = self.current.write().await;
        info!(
            previous = current.len(),
            keys = pool.len(),
            "credential pool replaced"
        );
        *current = pool;
    }
}
