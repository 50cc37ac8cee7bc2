//! Provider endpoints, model names and workflow sizes
//!
//! Model identifiers match the hosted Gemini API. They are not secrets.

use std::time::Duration;

/// REST base URL of the generative language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key (kept out of URLs so keys never reach access logs)
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Text and JSON generation
pub const TEXT_MODEL: &str = "gemini-2.5-flash";

/// Image generation and editing with reference images
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Text-to-speech
pub const TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Image-to-video
pub const VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";

/// Story ideas requested per genre
pub const IDEA_COUNT: usize = 8;

/// Scenes in one UGC script
pub const UGC_SCENE_COUNT: usize = 6;

/// Interval between video operation polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Language of narration and voice-over text unless configured otherwise
pub const DEFAULT_NARRATION_LANGUAGE: &str = "Indonesian";
