//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use genai::{AspectRatio, Gender, ProductCategory, Voice};

#[derive(Debug, Parser)]
#[command(name = "keyrelay-studio")]
#[command(about = "Story, image, speech and video generation over a pool of API keys", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to CONFIG_PATH, then ./keyrelay.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Text arguments accept `-` to read from stdin.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the configured key pool (masked)
    Keys,
    /// Generate story ideas for a genre
    Ideas { genre: String },
    /// Polish story text
    Polish { text: String },
    /// Write a full story from a plot
    Story {
        plot: String,
        #[arg(long, default_value = "fantasy")]
        genre: String,
        #[arg(long, default_value = "unspecified")]
        gender: Gender,
        /// Scenes the story will be paced for: 5, 10 or 15
        #[arg(long, default_value_t = 10)]
        scenes: usize,
    },
    /// Split a story into illustrated scenes
    Scenes {
        story: String,
        /// Base description of the main character
        #[arg(long, default_value = "")]
        character: String,
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Generate an image and write it as PNG
    Image {
        prompt: String,
        #[arg(long, default_value = "16:9")]
        aspect: AspectRatio,
        /// Reference image for consistency (repeatable)
        #[arg(long = "reference")]
        references: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Narrate text and write raw 24 kHz 16-bit mono PCM
    Speech {
        text: String,
        #[arg(long, default_value = "Kore")]
        voice: Voice,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write a six-scene UGC video script
    Ugc {
        theme: String,
        #[arg(long, default_value = "")]
        character: String,
        /// Product description; omit for a video without a product
        #[arg(long)]
        product: Option<String>,
        #[arg(long, default_value = "general")]
        category: ProductCategory,
        /// Shot preference, or `hand_focus` for hands-only close-ups
        #[arg(long, default_value = "medium shot")]
        shot: String,
    },
    /// Find song lyrics with web search
    Lyrics { query: String },
    /// Translate lyrics line by line
    Translate {
        lyrics: String,
        #[arg(long, default_value = "Indonesian")]
        language: String,
    },
    /// Expand an idea into a detailed visual prompt
    Prompt { idea: String },
    /// Animate an image and print the video download URL
    Video {
        image: PathBuf,
        #[arg(long, default_value = "")]
        prompt: String,
        /// Key to bill the video to (defaults to the first usable pool key)
        #[arg(long, env = "KEYRELAY_VIDEO_KEY", hide_env_values = true)]
        key: Option<String>,
    },
}
