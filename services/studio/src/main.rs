//! keyrelay-studio
//!
//! Command-line front end for the content workflows:
//! 1. Loads settings and API keys
//! 2. Builds the shared key pool, invoker and HTTP client
//! 3. Runs one workflow, cancelling it on Ctrl-C
//! 4. Prints the result to stdout; logs go to stderr as JSON

mod cli;
mod commands;
mod config;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use genai::{GenAiClient, Studio};
use key_pool::{CancellationToken, Invoker, SharedPool};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;
use crate::config::Config;

/// Exit status when the user has to fix their API keys.
const EXIT_NEEDS_CREDENTIALS: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "command failed");
            eprintln!("error: {err:#}");
            if needs_credentials(&err) {
                eprintln!(
                    "hint: configure API keys via KEYRELAY_API_KEYS, [credentials] in the config file, or GEMINI_API_KEY"
                );
                ExitCode::from(EXIT_NEEDS_CREDENTIALS)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.api.base_url,
        keys = config.credentials.pool.len(),
        max_attempts = config.retry.max_attempts,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let studio = Studio::new(
        GenAiClient::new(http, config.api.base_url.as_str()),
        Invoker::new(config.retry.policy()),
        Arc::new(SharedPool::new(config.credentials.pool.clone())),
        config.studio_options(),
    );

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        }
    });

    commands::execute(&studio, &cancel, cli.command).await
}

/// Missing, rejected or quota-exhausted keys.
fn needs_credentials(err: &anyhow::Error) -> bool {
    err.downcast_ref::<genai::Error>()
        .is_some_and(genai::Error::needs_credentials)
}
