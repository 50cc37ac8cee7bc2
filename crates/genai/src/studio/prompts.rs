//! Prompt text and response schemas for each workflow

use serde_json::{Value, json};

use super::types::{Gender, UgcRequest};
use crate::constants::{IDEA_COUNT, UGC_SCENE_COUNT};

pub(crate) fn story_ideas(genre: &str) -> String {
    format!(
        "Generate {IDEA_COUNT} creative and unique story ideas for the genre: \"{genre}\".\n\
         Return strictly a JSON array of strings."
    )
}

pub(crate) fn string_array_schema() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

pub(crate) fn polish_story(text: &str) -> String {
    format!(
        "Polish the following story text to make it more engaging, descriptive, and \
         professional, while keeping the same plot:\n\n{text}"
    )
}

/// Act outline sized to the number of visual scenes the story will be cut into.
pub(crate) fn story_structure(scene_count: usize) -> &'static str {
    match scene_count {
        5 => {
            "5-ACT STRUCTURE (short story):\n\
             1. Introduction\n\
             2. Inciting incident\n\
             3. Rising action\n\
             4. Climax\n\
             5. Resolution"
        }
        15 => {
            "15-ACT STRUCTURE (extended epic):\n\
             1. The ordinary world\n\
             2. The call to adventure\n\
             3. Refusal of the call\n\
             4. Meeting the mentor\n\
             5. Crossing the threshold\n\
             6. Allies and enemies\n\
             7. Approach to the inmost cave\n\
             8. The ordeal\n\
             9. The reward\n\
             10. The road back\n\
             11. Resurrection\n\
             12. Final climax\n\
             13. Aftermath of the climax\n\
             14. Final resolution\n\
             15. The elixir / moral of the story"
        }
        _ => {
            "10-ACT STRUCTURE (standard):\n\
             1. Opening\n\
             2. Normal life\n\
             3. The trigger\n\
             4. Doubt and the call\n\
             5. Setting out\n\
             6. Challenges and allies\n\
             7. Midpoint\n\
             8. Deep crisis\n\
             9. Epic climax\n\
             10. Resolution"
        }
    }
}

pub(crate) fn full_story(
    plot: &str,
    genre: &str,
    gender: Gender,
    scene_count: usize,
    language: &str,
) -> String {
    let protagonist = match gender {
        Gender::Male => "The main character is male. ",
        Gender::Female => "The main character is female. ",
        Gender::Unspecified => "",
    };
    let structure = story_structure(scene_count);
    format!(
        "Write a complete, engaging and well-structured story based on this plot: \"{plot}\". \
         Genre: {genre}. {protagonist}\n\n\
         SPECIAL INSTRUCTIONS:\n\
         So that the story paces well across {scene_count} visual scenes, follow this structure:\n\
         {structure}\n\n\
         Write in descriptive, emotional {language}. Make every act clearly distinct."
    )
}

pub(crate) fn story_scenes(
    story: &str,
    character: &str,
    scene_count: usize,
    language: &str,
) -> String {
    let character = if character.trim().is_empty() {
        "A main character"
    } else {
        character
    };
    format!(
        "Analyse the following story and split it into EXACTLY {scene_count} sequential key scenes.\n\n\
         IMPORTANT - OPTIMISE FOR A VIDEO GENERATOR:\n\
         1. Base character description: \"{character}\".\n\
         2. Every \"imagePrompt\" MUST be a CINEMATIC VIDEO PROMPT written in {language}.\n\
            - Include CAMERA MOVEMENT instructions (keep technical terms in English, e.g. \
         \"Slow dolly in\", \"Drone shot\", \"Pan right\", \"Tracking shot\").\n\
            - Describe the ACTION and MOVEMENT of the character and environment vividly.\n\
            - Style: 8k, photorealistic, cinematic lighting, 35mm film grain.\n\n\
         For each of the {scene_count} scenes return JSON with:\n\
         1. \"imagePrompt\": a VERY DETAILED video prompt in {language}.\n\
         2. \"narration\": voice-over text in {language} (clear, emotional, easy to read aloud).\n\n\
         STORY:\n{story}"
    )
}

pub(crate) fn scene_schema() -> Value {
    object_array_schema(&["imagePrompt", "narration"])
}

pub(crate) fn image(prompt: &str, has_references: bool) -> String {
    let consistency = if has_references {
        "\nSTRICT REFERENCE ADHERENCE:\n\
         - The output image MUST depict the EXACT SAME person/product as in the reference.\n\
         - Maintain consistent face, body, clothes, colors.\n"
    } else {
        ""
    };
    format!(
        "VISUAL PROMPT: {prompt}\n{consistency}\
         STYLE: Professional Commercial Photography, 8k resolution, highly detailed, \
         perfect lighting, cinematic composition."
    )
}

/// Shot instruction that replaces the `hand_focus` shorthand.
const HAND_FOCUS_SHOT: &str = "EXTREME CLOSE-UP on HANDS ONLY holding/using/touching the \
     product. Do NOT show faces. Focus on skin texture, grip, and the product details. POV \
     style is acceptable.";

pub(crate) fn ugc_scripts(request: &UgcRequest, language: &str) -> String {
    let hand_focus = request.shot_type == "hand_focus";
    let shot = if hand_focus {
        HAND_FOCUS_SHOT
    } else {
        request.shot_type.as_str()
    };
    let character = if request.character.trim().is_empty() {
        "A person"
    } else {
        request.character.as_str()
    };
    let product = request.product.as_deref().unwrap_or("None");
    let category = request.category;
    let action = category.action_verb();
    let hands_rule = if hand_focus {
        "4. VISUAL CONSTRAINT: FOCUS ON HANDS. Do not generate scenes with full body or faces.\n"
    } else {
        ""
    };
    let theme = &request.theme;
    format!(
        "You are a professional UGC Video Director.\n\
         Create exactly {UGC_SCENE_COUNT} distinct scenes for a viral short video.\n\n\
         CONTEXT:\n\
         - Character: {character}\n\
         - Product: {product}\n\
         - Product Category: {category} (character is {action} the product)\n\
         - Shot Type Preference: {shot}\n\
         - Overall Theme: {theme}\n\n\
         CRITICAL REQUIREMENTS (8 SECONDS RULE):\n\
         1. DURATION: Each scene must be designed to last exactly 8 SECONDS.\n\
         2. SCRIPT: The voice-over must be in {language}, concise but meaningful. Target \
         approx 15-20 words per scene to fit the 8-second timing comfortably.\n\
         3. VISUALS: Describe a cinematic action that takes time (e.g. \"Slow pan\", \
         \"Walking towards camera\", \"Rotating product\").\n\
         {hands_rule}\n\
         Return a JSON ARRAY of {UGC_SCENE_COUNT} objects. Each object must have:\n\
         1. \"visual_prompt\": A highly detailed English prompt for video generation.\n\
            - Explicitly mention \"8 seconds duration\" or \"slow motion\" style.\n\
            - Enforce Shot Type: {shot}.\n\
         2. \"spoken_script\": {language} voice-over text (approx 2 sentences, ~8 seconds spoken)."
    )
}

pub(crate) fn ugc_schema() -> Value {
    object_array_schema(&["visual_prompt", "spoken_script"])
}

pub(crate) fn find_lyrics(query: &str) -> String {
    format!(
        "Find the exact lyrics for this song: \"{query}\".\n\
         If it's a YouTube URL, identify the song first.\n\n\
         Return the lyrics formatted with structure tags like [Verse 1], [Chorus], [Bridge].\n\
         Do NOT include chords.\n\
         Do NOT include translation yet.\n\
         Just the original lyrics in their original language."
    )
}

pub(crate) fn translate_lyrics(lyrics: &str, language: &str) -> String {
    format!(
        "Translate the following song lyrics to {language}.\n\
         Maintain the line-by-line structure exactly.\n\n\
         INPUT LYRICS:\n{lyrics}\n\n\
         OUTPUT FORMAT:\n\
         Return a JSON ARRAY of objects:\n\
         [\n\
           {{ \"original\": \"Original line 1\", \"translated\": \"Translated line 1\" }},\n\
           {{ \"original\": \"[Chorus]\", \"translated\": \"[Chorus]\" }},\n\
           ...\n\
         ]"
    )
}

pub(crate) fn lyric_schema() -> Value {
    object_array_schema(&["original", "translated"])
}

pub(crate) fn optimize_video_prompt(idea: &str) -> String {
    format!(
        "You are a professional AI prompt engineer.\n\
         Convert this simple idea into a highly detailed, photorealistic image or video prompt.\n\n\
         Input Idea: \"{idea}\"\n\n\
         Requirements:\n\
         - Focus on texture, lighting (e.g. volumetric, golden hour), and realistic details (8k, raw photo).\n\
         - Mention specific camera lenses or styles if relevant (e.g. 35mm, f/1.8).\n\
         - Describe the scene vividly.\n\
         - Keep it under 100 words.\n\
         - Output ONLY the prompt text in English."
    )
}

/// Array of objects whose listed string fields are all required.
fn object_array_schema(fields: &[&str]) -> Value {
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "STRING" })))
        .collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": fields,
        }
    })
}
