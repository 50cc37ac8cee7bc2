//! Subcommand execution: run a workflow, print or write its result
//!
//! Results go to stdout (JSON for structured output, plain text otherwise);
//! logs go to stderr.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::ApiKey;
use genai::{Studio, UgcRequest};
use key_pool::{CancellationToken, CredentialPool};
use serde::Serialize;
use tracing::info;

use crate::cli::Command;

pub async fn execute(
    studio: &Studio,
    cancel: &CancellationToken,
    command: Command,
) -> Result<()> {
    match command {
        Command::Keys => {
            let pool = studio.pool().snapshot().await;
            print_json(&pool.summary())
        }
        Command::Ideas { genre } => print_json(&studio.story_ideas(cancel, &genre).await?),
        Command::Polish { text } => {
            let text = read_text(&text)?;
            print_text(&studio.polish_story(cancel, &text).await?)
        }
        Command::Story {
            plot,
            genre,
            gender,
            scenes,
        } => {
            let plot = read_text(&plot)?;
            let story = studio
                .full_story(cancel, &plot, &genre, gender, scenes)
                .await?;
            print_text(&story)
        }
        Command::Scenes {
            story,
            character,
            count,
        } => {
            let story = read_text(&story)?;
            print_json(&studio.story_scenes(cancel, &story, &character, count).await?)
        }
        Command::Image {
            prompt,
            aspect,
            references,
            output,
        } => {
            let references = references
                .iter()
                .map(|path| read_image_data_url(path))
                .collect::<Result<Vec<_>>>()?;
            let image = studio
                .generate_image(cancel, &prompt, aspect, &references)
                .await?;
            let payload = image.split_once(";base64,").map_or(image.as_str(), |(_, d)| d);
            write_base64(&output, payload)
        }
        Command::Speech {
            text,
            voice,
            output,
        } => {
            let text = read_text(&text)?;
            let audio = studio.generate_speech(cancel, &text, voice).await?;
            write_base64(&output, &audio)
        }
        Command::Ugc {
            theme,
            character,
            product,
            category,
            shot,
        } => {
            let request = UgcRequest {
                theme,
                character,
                product,
                category,
                shot_type: shot,
            };
            print_json(&studio.ugc_scripts(cancel, &request).await?)
        }
        Command::Lyrics { query } => print_json(&studio.find_lyrics(cancel, &query).await?),
        Command::Translate { lyrics, language } => {
            let lyrics = read_text(&lyrics)?;
            print_json(&studio.translate_lyrics(cancel, &lyrics, &language).await?)
        }
        Command::Prompt { idea } => {
            print_text(&studio.optimize_video_prompt(cancel, &idea).await?)
        }
        Command::Video { image, prompt, key } => {
            let image = read_image_data_url(&image)?;
            let key = match key {
                Some(key) => ApiKey::new(key),
                None => first_usable(&studio.pool().snapshot().await),
            };
            let url = studio.image_to_video(cancel, &key, &prompt, &image).await?;
            print_text(&url)
        }
    }
}

/// The argument itself, or all of stdin when it is `-`.
fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}

fn read_image_data_url(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    Ok(format!(
        "data:{};base64,{}",
        image_mime(path),
        STANDARD.encode(bytes)
    ))
}

fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// First non-blank key, or a blank one so the invoker reports missing credentials.
fn first_usable(pool: &CredentialPool) -> ApiKey {
    pool.usable().next().cloned().unwrap_or_else(|| ApiKey::new(""))
}

fn write_base64(path: &Path, payload: &str) -> Result<()> {
    let bytes = STANDARD
        .decode(payload.trim())
        .context("provider returned invalid base64 media")?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "media written");
    println!("{}", path.display());
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_text(text: &str) -> Result<()> {
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(image_mime(Path::new("ref.PNG")), "image/png");
        assert_eq!(image_mime(Path::new("ref.webp")), "image/webp");
        assert_eq!(image_mime(Path::new("ref.jpeg")), "image/jpeg");
        assert_eq!(image_mime(Path::new("no_extension")), "image/jpeg");
    }

    #[test]
    fn image_file_becomes_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
        assert_eq!(
            read_image_data_url(&path).unwrap(),
            "data:image/png;base64,iVBORw=="
        );
    }

    #[test]
    fn missing_image_has_context() {
        let err = read_image_data_url(Path::new("/nonexistent/ref.png")).unwrap_err();
        assert!(err.to_string().contains("failed to read image"));
    }

    #[test]
    fn media_is_decoded_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.pcm");
        write_base64(&path, "AAEC\n").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), [0, 1, 2]);
    }

    #[test]
    fn invalid_media_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.png");
        assert!(write_base64(&path, "not base64!").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn video_key_defaults_to_first_usable() {
        let pool = CredentialPool::new(["", "second", "third"]);
        assert_eq!(first_usable(&pool).expose(), "second");
        assert!(first_usable(&CredentialPool::default()).is_blank());
    }

    #[test]
    fn plain_text_argument_is_returned() {
        assert_eq!(read_text("once upon a time").unwrap(), "once upon a time");
    }
}
