//! Content workflows: one prompt, one resilient call, one parsed result
//!
//! Every workflow snapshots the session pool and hands a single
//! `generateContent` call to `Invoker::invoke`. Content that cannot be used
//! (no scenes, a refused image, missing audio) is reported from inside the
//! call as a permanent `ProviderError`, so the invoker moves on to the next
//! key instead of retrying the same one.

mod prompts;
mod types;

use std::sync::Arc;
use std::time::Duration;

use common::ApiKey;
use key_pool::{CancellationToken, Invoker, SharedPool};
use provider::ProviderError;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::client::GenAiClient;
use crate::constants::{
    DEFAULT_NARRATION_LANGUAGE, DEFAULT_POLL_INTERVAL, IMAGE_MODEL, TEXT_MODEL, TTS_MODEL,
    UGC_SCENE_COUNT,
};
use crate::error::Result;
use crate::sanitize::safe_json_parse;
use crate::types::{GenerateRequest, GenerateResponse, GenerationConfig, InlineData, Part};

pub use types::{
    AspectRatio, Gender, LyricLine, Lyrics, ParseChoiceError, ProductCategory, Scene, StoryIdea,
    UgcRequest, UgcScene, Voice,
};

/// Shown when a search for lyrics returns no text.
const LYRICS_NOT_FOUND: &str = "Lyrics not found.";

#[derive(Debug, Clone)]
pub struct StudioOptions {
    /// Language for narration, voice-over and story text
    pub narration_language: String,
    /// Interval between video operation polls
    pub poll_interval: Duration,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            narration_language: DEFAULT_NARRATION_LANGUAGE.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Session handle for all workflows.
pub struct Studio {
    client: GenAiClient,
    invoker: Invoker,
    pool: Arc<SharedPool>,
    options: StudioOptions,
}

impl Studio {
    pub fn new(
        client: GenAiClient,
        invoker: Invoker,
        pool: Arc<SharedPool>,
        options: StudioOptions,
    ) -> Self {
        Self {
            client,
            invoker,
            pool,
            options,
        }
    }

    /// The session's key pool, for replacing keys between invocations.
    pub fn pool(&self) -> &Arc<SharedPool> {
        &self.pool
    }

    /// One `generateContent` call on `model` with pool failover, then `parse`.
    async fn run<T, P>(
        &self,
        cancel: &CancellationToken,
        model: &str,
        request: &GenerateRequest,
        parse: P,
    ) -> Result<T>
    where
        P: Fn(GenerateResponse) -> provider::Result<T>,
    {
        let pool = self.pool.snapshot().await;
        let parse = &parse;
        let value = self
            .invoker
            .invoke(&pool, cancel, |key| async move {
                let response = self.client.generate_content(&key, model, request).await?;
                parse(response)
            })
            .await?;
        Ok(value)
    }

    /// Eight story ideas for a genre, each with a fresh id.
    pub async fn story_ideas(
        &self,
        cancel: &CancellationToken,
        genre: &str,
    ) -> Result<Vec<StoryIdea>> {
        let request = GenerateRequest::text(prompts::story_ideas(genre))
            .with_json_schema(prompts::string_array_schema());
        let texts: Vec<String> = self
            .run(cancel, TEXT_MODEL, &request, |response| {
                Ok(safe_json_parse(&response.text().unwrap_or_default(), Vec::new()))
            })
            .await?;

        let ideas: Vec<StoryIdea> = texts
            .into_iter()
            .map(|text| StoryIdea {
                id: Uuid::new_v4().to_string(),
                text,
            })
            .collect();
        info!(genre, count = ideas.len(), "story ideas generated");
        Ok(ideas)
    }

    /// Rewrite story text for style. An empty reply keeps the input.
    pub async fn polish_story(&self, cancel: &CancellationToken, text: &str) -> Result<String> {
        let request = GenerateRequest::text(prompts::polish_story(text));
        self.run(cancel, TEXT_MODEL, &request, |response| {
            Ok(response.text().unwrap_or_else(|| text.to_string()))
        })
        .await
    }

    /// Expand a plot into a full story paced for `scene_count` scenes.
    pub async fn full_story(
        &self,
        cancel: &CancellationToken,
        plot: &str,
        genre: &str,
        gender: Gender,
        scene_count: usize,
    ) -> Result<String> {
        let prompt = prompts::full_story(
            plot,
            genre,
            gender,
            scene_count,
            &self.options.narration_language,
        );
        let story = self
            .run(cancel, TEXT_MODEL, &GenerateRequest::text(prompt), |response| {
                Ok(response.text().unwrap_or_default().trim().to_string())
            })
            .await?;
        info!(genre, scene_count, chars = story.len(), "full story generated");
        Ok(story)
    }

    /// Split a story into at most `scene_count` scenes with video prompts.
    pub async fn story_scenes(
        &self,
        cancel: &CancellationToken,
        story: &str,
        character: &str,
        scene_count: usize,
    ) -> Result<Vec<Scene>> {
        let prompt = prompts::story_scenes(
            story,
            character,
            scene_count,
            &self.options.narration_language,
        );
        let request = GenerateRequest::text(prompt).with_json_schema(prompts::scene_schema());
        self.run(cancel, TEXT_MODEL, &request, |response| {
            let mut scenes: Vec<Scene> =
                safe_json_parse(&response.text().unwrap_or_default(), Vec::new());
            if scenes.is_empty() {
                return Err(ProviderError::permanent(
                    "failed to generate story scenes (invalid JSON)",
                ));
            }
            scenes.truncate(scene_count);
            Ok(scenes)
        })
        .await
    }

    /// Generate one image, optionally matching reference images.
    ///
    /// References are data URLs (or raw base64 JPEG). Returns a PNG data URL.
    pub async fn generate_image(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
        aspect: AspectRatio,
        references: &[String],
    ) -> Result<String> {
        let mut parts: Vec<Part> = references
            .iter()
            .map(|r| Part::inline(InlineData::from_data_url(r, "image/jpeg")))
            .collect();
        parts.push(Part::text(prompts::image(prompt, !references.is_empty())));
        let request = GenerateRequest::parts(parts).with_config(GenerationConfig {
            image_config: Some(json!({ "aspectRatio": aspect.as_str() })),
            ..GenerationConfig::default()
        });

        debug!(aspect = %aspect, references = references.len(), "generating image");
        self.run(cancel, IMAGE_MODEL, &request, image_from_response)
            .await
    }

    /// Narrate `text` with a prebuilt voice. Returns base64 raw PCM.
    pub async fn generate_speech(
        &self,
        cancel: &CancellationToken,
        text: &str,
        voice: Voice,
    ) -> Result<String> {
        let request = GenerateRequest::parts(vec![Part::text(text)]).with_config(GenerationConfig {
            response_modalities: Some(vec!["AUDIO".to_string()]),
            speech_config: Some(json!({
                "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": voice.as_str() } }
            })),
            ..GenerationConfig::default()
        });
        self.run(cancel, TTS_MODEL, &request, |response| {
            response
                .inline_data()
                .map(|audio| audio.data.clone())
                .ok_or_else(|| ProviderError::permanent("failed to generate audio (no data)"))
        })
        .await
    }

    /// Six-scene script for a short marketing video.
    pub async fn ugc_scripts(
        &self,
        cancel: &CancellationToken,
        request: &UgcRequest,
    ) -> Result<Vec<UgcScene>> {
        let prompt = prompts::ugc_scripts(request, &self.options.narration_language);
        let generate = GenerateRequest::text(prompt).with_json_schema(prompts::ugc_schema());
        let scenes = self
            .run(cancel, TEXT_MODEL, &generate, |response| {
                let mut scenes: Vec<UgcScene> =
                    safe_json_parse(&response.text().unwrap_or_default(), Vec::new());
                if scenes.is_empty() {
                    return Err(ProviderError::permanent("failed to generate scripts"));
                }
                scenes.truncate(UGC_SCENE_COUNT);
                Ok(scenes)
            })
            .await?;
        info!(category = %request.category, scenes = scenes.len(), "UGC script generated");
        Ok(scenes)
    }

    /// Look up song lyrics with search grounding.
    pub async fn find_lyrics(&self, cancel: &CancellationToken, query: &str) -> Result<Lyrics> {
        let request = GenerateRequest::text(prompts::find_lyrics(query)).with_search();
        self.run(cancel, TEXT_MODEL, &request, |response| {
            Ok(Lyrics {
                lyrics: response
                    .text()
                    .unwrap_or_else(|| LYRICS_NOT_FOUND.to_string()),
                sources: response.grounding_sources(),
            })
        })
        .await
    }

    /// Line-by-line translation. Unparseable output gives an empty list.
    pub async fn translate_lyrics(
        &self,
        cancel: &CancellationToken,
        lyrics: &str,
        language: &str,
    ) -> Result<Vec<LyricLine>> {
        let request = GenerateRequest::text(prompts::translate_lyrics(lyrics, language))
            .with_json_schema(prompts::lyric_schema());
        self.run(cancel, TEXT_MODEL, &request, |response| {
            Ok(safe_json_parse(&response.text().unwrap_or_default(), Vec::new()))
        })
        .await
    }

    /// Turn a short idea into a detailed image or video prompt.
    pub async fn optimize_video_prompt(
        &self,
        cancel: &CancellationToken,
        idea: &str,
    ) -> Result<String> {
        let request = GenerateRequest::text(prompts::optimize_video_prompt(idea));
        self.run(cancel, TEXT_MODEL, &request, |response| {
            Ok(response.text().unwrap_or_default())
        })
        .await
    }

    /// Animate an image on one caller-chosen key. See [`crate::video`].
    pub async fn image_to_video(
        &self,
        cancel: &CancellationToken,
        key: &ApiKey,
        prompt: &str,
        image: &str,
    ) -> Result<String> {
        crate::video::generate_video(
            &self.client,
            &self.invoker,
            key,
            cancel,
            prompt,
            image,
            self.options.poll_interval,
        )
        .await
    }
}

/// Finish reasons the provider reports when a filter blocked the output.
const SAFETY_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "IMAGE_PROHIBITED_CONTENT",
    "BLOCKLIST",
];

const SAFETY_REFUSAL: &str = "image rejected by the safety filter; try a different prompt";

/// Image bytes from the reply, or a permanent error describing why there are none.
fn image_from_response(response: GenerateResponse) -> provider::Result<String> {
    if let Some(image) = response.inline_data() {
        return Ok(format!("data:image/png;base64,{}", image.data));
    }
    let blocked = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
        .is_some_and(|reason| SAFETY_FINISH_REASONS.contains(&reason));
    if blocked {
        return Err(ProviderError::permanent(SAFETY_REFUSAL));
    }
    match response.text() {
        Some(text) => {
            let lower = text.to_lowercase();
            if lower.contains("safety") || lower.contains("unsafe") {
                Err(ProviderError::permanent(SAFETY_REFUSAL))
            } else {
                Err(ProviderError::permanent(format!("model refused: {text}")))
            }
        }
        None => Err(ProviderError::permanent("no image data returned")),
    }
}
