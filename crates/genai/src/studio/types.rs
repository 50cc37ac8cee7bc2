//! Inputs and outputs of the studio workflows

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryIdea {
    pub id: String,
    pub text: String,
}

/// One illustrated story scene: a video-ready visual prompt and its narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    pub narration: String,
}

/// One scene of a short-form marketing video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UgcScene {
    pub visual_prompt: String,
    pub spoken_script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricLine {
    pub original: String,
    pub translated: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lyrics {
    pub lyrics: String,
    pub sources: Vec<crate::types::Source>,
}

/// Error for the `FromStr` impls below.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct ParseChoiceError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

macro_rules! choice_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseChoiceError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseChoiceError {
                        kind: $kind,
                        value: s.to_string(),
                        expected: concat!($($text, " "),+),
                    }),
                }
            }
        }
    };
}

choice_enum!(
    /// Gender of the main character, used to steer story text.
    Gender, "gender" {
        Male => "male",
        Female => "female",
        Unspecified => "unspecified",
    }
);

choice_enum!(
    /// Output frame shape for images.
    AspectRatio, "aspect ratio" {
        Landscape => "16:9",
        Portrait => "9:16",
    }
);

choice_enum!(
    /// Prebuilt narrator voices.
    Voice, "voice" {
        Kore => "Kore",
        Puck => "Puck",
        Zephyr => "Zephyr",
    }
);

choice_enum!(
    /// What kind of product a UGC video features; decides how it is handled on camera.
    ProductCategory, "product category" {
        General => "general",
        Clothing => "clothing",
        PerfumeSkincare => "perfume_skincare",
        Vehicle => "vehicle",
        Footwear => "footwear",
        Headwear => "headwear",
        Eyewear => "eyewear",
        ToyGadget => "toy_gadget",
    }
);

impl ProductCategory {
    /// How the character interacts with the product on screen.
    pub fn action_verb(&self) -> &'static str {
        match self {
            ProductCategory::General => "Holding/Showing",
            ProductCategory::Clothing => "WEARING on body",
            ProductCategory::PerfumeSkincare => "HOLDING in hand / APPLYING",
            ProductCategory::Vehicle => "RIDING / DRIVING / SITTING ON",
            ProductCategory::Footwear => "WEARING on feet",
            ProductCategory::Headwear => "WEARING on head",
            ProductCategory::Eyewear => "WEARING on face",
            ProductCategory::ToyGadget => "PLAYING WITH / HOLDING",
        }
    }
}

/// Brief for a UGC script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UgcRequest {
    pub theme: String,
    pub character: String,
    /// Product description; `None` for a video without a product
    pub product: Option<String>,
    pub category: ProductCategory,
    /// Free-form shot preference, or `hand_focus` for hands-only close-ups
    pub shot_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_parse_and_display() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::Portrait);
        assert_eq!(AspectRatio::Landscape.to_string(), "16:9");
        assert_eq!("Puck".parse::<Voice>().unwrap(), Voice::Puck);
        assert_eq!(
            "perfume_skincare".parse::<ProductCategory>().unwrap(),
            ProductCategory::PerfumeSkincare
        );
    }

    #[test]
    fn unknown_choice_lists_expected_values() {
        let err = "square".parse::<AspectRatio>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown aspect ratio 'square', expected one of: 16:9 9:16 "
        );
    }

    #[test]
    fn scene_uses_camel_case_prompt_field() {
        let scene: Scene =
            serde_json::from_str(r#"{"imagePrompt":"Drone shot","narration":"Once"}"#).unwrap();
        assert_eq!(scene.image_prompt, "Drone shot");
    }

    #[test]
    fn every_category_has_an_action() {
        for category in [
            ProductCategory::General,
            ProductCategory::Clothing,
            ProductCategory::PerfumeSkincare,
            ProductCategory::Vehicle,
            ProductCategory::Footwear,
            ProductCategory::Headwear,
            ProductCategory::Eyewear,
            ProductCategory::ToyGadget,
        ] {
            assert!(!category.action_verb().is_empty(), "{category}");
        }
    }
}
