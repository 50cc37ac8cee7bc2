//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! API keys come from KEYRELAY_API_KEYS, the `keys` list, `keys_file`, or the
//! single GEMINI_API_KEY / API_KEY fallback, in that order. The first source
//! that yields any key wins.

use std::path::{Path, PathBuf};
use std::time::Duration;

use genai::StudioOptions;
use genai::constants::{DEFAULT_BASE_URL, DEFAULT_NARRATION_LANGUAGE};
use key_pool::{CredentialPool, RetryPolicy};
use serde::Deserialize;

/// Comma-separated key list that overrides everything in the file
const KEYS_ENV: &str = "KEYRELAY_API_KEYS";
/// Single-key fallbacks, checked in order
const FALLBACK_KEY_ENVS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub retry: RetryConfig,
    pub api: ApiConfig,
    pub studio: StudioConfig,
}

/// Where API keys come from
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Keys in preference order. Prefer `keys_file` or the env var outside local use.
    pub keys: Vec<String>,
    /// One key per line; blank lines and `#` comments are skipped
    pub keys_file: Option<PathBuf>,
    #[serde(skip)]
    pub pool: CredentialPool,
}

/// Per-key retry policy
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_rate_limit_wait_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_rate_limit_wait_secs: policy.max_rate_limit_wait.as_secs(),
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_rate_limit_wait: Duration::from_secs(self.max_rate_limit_wait_secs),
        }
    }
}

/// Provider endpoint settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub video_poll_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
            video_poll_secs: 5,
        }
    }
}

/// Workflow settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Language of generated narration and voice-over
    pub narration_language: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            narration_language: DEFAULT_NARRATION_LANGUAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, validate it, then resolve API keys.
    ///
    /// A missing file is not an error: every setting has a default and keys
    /// may come from the environment alone.
    pub fn load(path: &Path) -> common::Result<Self> {
        let mut config: Config = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e.into()),
        };

        config.validate()?;
        config.credentials.pool = config.credentials.resolve_keys()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.api.video_poll_secs == 0 {
            return Err(common::Error::Config(
                "video_poll_secs must be greater than 0".into(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(common::Error::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn studio_options(&self) -> StudioOptions {
        StudioOptions {
            narration_language: self.studio.narration_language.clone(),
            poll_interval: Duration::from_secs(self.api.video_poll_secs),
        }
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("keyrelay.toml")
    }
}

impl CredentialsConfig {
    fn resolve_keys(&self) -> common::Result<CredentialPool> {
        if let Ok(list) = std::env::var(KEYS_ENV) {
            let keys = split_keys(&list);
            if !keys.is_empty() {
                return Ok(CredentialPool::new(keys));
            }
        }

        let mut keys = self.keys.clone();
        if keys.is_empty()
            && let Some(ref keys_file) = self.keys_file
        {
            let contents = std::fs::read_to_string(keys_file).map_err(|e| {
                common::Error::Config(format!(
                    "failed to read keys_file {}: {e}",
                    keys_file.display()
                ))
            })?;
            keys = parse_keys_file(&contents);
        }

        let fallback = FALLBACK_KEY_ENVS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|key| !key.trim().is_empty());
        Ok(CredentialPool::with_fallback(keys, fallback))
    }
}

fn split_keys(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_keys_file(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    /// SAFETY: Callers must hold ENV_MUTEX.
    unsafe fn clear_key_env() {
        unsafe {
            remove_env(KEYS_ENV);
            for name in FALLBACK_KEY_ENVS {
                remove_env(name);
            }
        }
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("keyrelay.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn exposed(pool: &CredentialPool) -> Vec<String> {
        pool.keys().iter().map(|k| k.expose().to_string()).collect()
    }

    #[test]
    fn test_load_full_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[credentials]
keys = ["AIza-first", "AIza-second"]

[retry]
max_attempts = 5
base_delay_ms = 250
max_rate_limit_wait_secs = 10

[api]
base_url = "http://localhost:9000/v1beta"
timeout_secs = 30
video_poll_secs = 2

[studio]
narration_language = "English"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(exposed(&config.credentials.pool), ["AIza-first", "AIza-second"]);
        let policy = config.retry.policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_rate_limit_wait, Duration::from_secs(10));
        assert_eq!(config.api.base_url, "http://localhost:9000/v1beta");
        let options = config.studio_options();
        assert_eq!(options.narration_language, "English");
        assert_eq!(options.poll_interval, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };

        let config = Config::load(Path::new("/nonexistent/path/keyrelay.toml")).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_secs, 120);
        assert_eq!(config.retry.policy(), RetryPolicy::default());
        assert_eq!(config.retry.max_rate_limit_wait_secs, 0);
        assert_eq!(config.studio.narration_language, "Indonesian");
        assert!(config.credentials.pool.is_empty());
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");

        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Toml(_))));
    }

    #[test]
    fn test_keys_env_overrides_file_keys() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[credentials]
keys = ["from-file"]
keys_file = "/nonexistent/keys.txt"
"#,
        );

        unsafe { set_env(KEYS_ENV, " env-1 , ,env-2") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env(KEYS_ENV) };
        assert_eq!(
            exposed(&config.credentials.pool),
            ["env-1", "env-2"],
            "KEYRELAY_API_KEYS must win and the keys_file must not be read"
        );
    }

    #[test]
    fn test_keys_list_overrides_keys_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[credentials]
keys = ["listed"]
keys_file = "/nonexistent/keys.txt"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(exposed(&config.credentials.pool), ["listed"]);
    }

    #[test]
    fn test_keys_from_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let keys_path = dir.path().join("keys.txt");
        std::fs::write(&keys_path, "# team keys\nAIza-one\n\n  AIza-two  \n#AIza-disabled\n")
            .unwrap();
        let path = write_config(
            &dir,
            &format!(
                "[credentials]\nkeys_file = \"{}\"\n",
                keys_path.display()
            ),
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(exposed(&config.credentials.pool), ["AIza-one", "AIza-two"]);
    }

    #[test]
    fn test_keys_file_nonexistent_returns_error() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            "[credentials]\nkeys_file = \"/nonexistent/path/keys.txt\"\n",
        );

        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("failed to read keys_file"),
            "got: {err}"
        );
    }

    #[test]
    fn test_single_key_fallback() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "");

        unsafe { set_env("API_KEY", "generic-key") };
        let config = Config::load(&path).unwrap();
        assert_eq!(exposed(&config.credentials.pool), ["generic-key"]);

        unsafe { set_env("GEMINI_API_KEY", "gemini-key") };
        let config = Config::load(&path).unwrap();
        assert_eq!(
            exposed(&config.credentials.pool),
            ["gemini-key"],
            "GEMINI_API_KEY is checked before API_KEY"
        );
        unsafe { clear_key_env() };
    }

    #[test]
    fn test_blank_fallback_does_not_hide_next() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "");

        unsafe {
            set_env("GEMINI_API_KEY", "  ");
            set_env("API_KEY", "generic-key");
        }
        let config = Config::load(&path).unwrap();
        unsafe { clear_key_env() };
        assert_eq!(exposed(&config.credentials.pool), ["generic-key"]);
    }

    #[test]
    fn test_fallback_ignored_when_keys_configured() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[credentials]\nkeys = [\"configured\"]\n");

        unsafe { set_env("GEMINI_API_KEY", "fallback") };
        let config = Config::load(&path).unwrap();
        unsafe { clear_key_env() };
        assert_eq!(exposed(&config.credentials.pool), ["configured"]);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { clear_key_env() };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[api]\nbase_url = \"generativelanguage.googleapis.com\"\n");

        let err = Config::load(&path).unwrap_err();
        assert!(
            err.to_string().contains("base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[api]\ntimeout_secs = 0\n");
        assert!(Config::load(&path).is_err(), "timeout_secs = 0 must be rejected");
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "[retry]\nmax_attempts = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("keyrelay.toml"));
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            path,
            PathBuf::from("/cli/wins.toml"),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}
