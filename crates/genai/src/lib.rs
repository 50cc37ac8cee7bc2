//! Generative-AI client and content workflows on top of the key pool
//!
//! - `client` talks HTTP to the provider and classifies its failures
//! - `sanitize` salvages JSON from model text
//! - `video` runs long image-to-video operations on one fixed key
//! - `studio` builds prompts for each workflow and runs them through the
//!   resilient invoker with the session's key pool

pub mod client;
pub mod constants;
pub mod error;
pub mod sanitize;
pub mod studio;
pub mod types;
pub mod video;

pub use client::GenAiClient;
pub use error::{Error, Result};
pub use sanitize::{clean_json_text, safe_json_parse};
pub use studio::{
    AspectRatio, Gender, LyricLine, Lyrics, ProductCategory, Scene, StoryIdea, Studio,
    StudioOptions, UgcRequest, UgcScene, Voice,
};
pub use video::generate_video;
