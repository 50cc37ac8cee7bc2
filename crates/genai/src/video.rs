//! Image-to-video generation on a single, caller-supplied key
//!
//! Video models are billed per key and the operation handle is only valid for
//! the key that created it, so there is no failover here: the start call and
//! every poll go through `Invoker::invoke_single` with the same key.

use std::time::Duration;

use common::ApiKey;
use key_pool::{CancellationToken, InvokeError, Invoker};
use provider::error_message;
use tracing::{debug, info};

use crate::client::GenAiClient;
use crate::constants::VIDEO_MODEL;
use crate::error::{Error, Result};
use crate::types::InlineData;

/// Prompt used when the caller leaves it blank.
const DEFAULT_VIDEO_PROMPT: &str = "Animate this image naturally";

/// Start an image-to-video operation and poll it to completion.
///
/// `image` is a `data:image/...;base64,` URL or raw base64 (assumed JPEG).
/// Returns a download URL for the first generated video, with the key appended
/// as the provider requires for file downloads.
pub async fn generate_video(
    client: &GenAiClient,
    invoker: &Invoker,
    key: &ApiKey,
    cancel: &CancellationToken,
    prompt: &str,
    image: &str,
    poll_interval: Duration,
) -> Result<String> {
    let image = InlineData::from_data_url(image, "image/jpeg");
    let prompt = if prompt.trim().is_empty() {
        DEFAULT_VIDEO_PROMPT
    } else {
        prompt
    };

    let mut operation = invoker
        .invoke_single(key, cancel, |key| {
            let image = &image;
            async move { client.start_video(&key, VIDEO_MODEL, prompt, image).await }
        })
        .await?;
    info!(operation = %operation.name, "video generation started");

    loop {
        if let Some(err) = operation.error.as_ref() {
            return Err(Error::Operation(error_message(err)));
        }
        if operation.done {
            break;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(InvokeError::Cancelled.into()),
            _ = tokio::time::sleep(poll_interval) => {}
        }

        let name = operation.name.clone();
        operation = invoker
            .invoke_single(key, cancel, |key| {
                let name = &name;
                async move { client.poll_operation(&key, name).await }
            })
            .await?;
        debug!(operation = %operation.name, done = operation.done, "polled video operation");
    }

    let uri = operation.video_uri().ok_or_else(|| {
        Error::MissingOutput("video generation completed but no URI returned".to_string())
    })?;
    info!(operation = %operation.name, "video generation finished");
    Ok(format!("{uri}&key={}", key.expose()))
}
