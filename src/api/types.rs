//! Wire types for the Gemini `generateContent` REST endpoint, plus the
//! request-shaping enums (aspect ratio, style preset) the app persists.

use serde::{Deserialize, Serialize};

/// A base64-encoded image payload as it travels to and from the API.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub data: String,
    pub mime_type: String,
}

// ===== Request body =====

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

#[derive(Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

/// One part of a content block: either inline image data or text.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            inline_data: None,
            text: Some(s.into()),
        }
    }

    pub fn image(image: InlineImage) -> Self {
        Self {
            inline_data: Some(image),
            text: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Tool declarations. Only search grounding is used, and its config is empty.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: serde_json::Value,
}

impl Tool {
    pub fn google_search() -> Self {
        Self {
            google_search: serde_json::json!({}),
        }
    }
}

// ===== Response body =====

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// First inline-image part among the first candidate's parts.
    pub fn first_image(&self) -> Option<&InlineImage> {
        self.candidates
            .as_deref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.inline_data.as_ref())
    }

    /// All text parts of the first candidate, concatenated.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.as_deref()?.first()?.content.as_ref()?.parts;
        let joined: String = parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        if joined.is_empty() { None } else { Some(joined) }
    }
}

// ===== Request-shaping enums =====

/// Output aspect ratio. The image model ignores a config field for this, so
/// the choice is appended to the prompt as a text instruction instead.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    Square,
    Wide,
    #[default]
    Tall,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [AspectRatio::Square, AspectRatio::Wide, AspectRatio::Tall];

    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            AspectRatio::Square => "aspect.square",
            AspectRatio::Wide => "aspect.wide",
            AspectRatio::Tall => "aspect.tall",
        }
    }

    /// Prompt clause appended after the user's text.
    pub fn clause(self) -> &'static str {
        match self {
            AspectRatio::Square => " . Square aspect ratio 1:1.",
            AspectRatio::Wide => " . Wide cinematic aspect ratio 16:9.",
            AspectRatio::Tall => " . Tall portrait aspect ratio 9:16.",
        }
    }
}

/// Style presets appended to fresh generations (never to edits).
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum StylePreset {
    #[default]
    None,
    Photorealistic,
    Cinematic,
    Cartoon,
    Watercolor,
    Fantasy,
    Anime,
}

impl StylePreset {
    pub const ALL: [StylePreset; 7] = [
        StylePreset::None,
        StylePreset::Photorealistic,
        StylePreset::Cinematic,
        StylePreset::Cartoon,
        StylePreset::Watercolor,
        StylePreset::Fantasy,
        StylePreset::Anime,
    ];

    /// Stable id used in the settings file.
    pub fn id(self) -> &'static str {
        match self {
            StylePreset::None => "none",
            StylePreset::Photorealistic => "photorealistic",
            StylePreset::Cinematic => "cinematic",
            StylePreset::Cartoon => "cartoon",
            StylePreset::Watercolor => "watercolor",
            StylePreset::Fantasy => "fantasy",
            StylePreset::Anime => "anime",
        }
    }

    pub fn from_id(id: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .unwrap_or_default()
    }

    pub fn label_key(self) -> &'static str {
        match self {
            StylePreset::None => "style.none",
            StylePreset::Photorealistic => "style.photorealistic",
            StylePreset::Cinematic => "style.cinematic",
            StylePreset::Cartoon => "style.cartoon",
            StylePreset::Watercolor => "style.watercolor",
            StylePreset::Fantasy => "style.fantasy",
            StylePreset::Anime => "style.anime",
        }
    }

    /// Comma-appended prompt suffix; empty for `None`.
    pub fn suffix(self) -> &'static str {
        match self {
            StylePreset::None => "",
            StylePreset::Photorealistic => {
                "photorealistic, hyper-detailed, 8k, sharp focus, professional photography"
            }
            StylePreset::Cinematic => "cinematic lighting, dramatic, movie still, film grain",
            StylePreset::Cartoon => "cartoon style, vibrant colors, bold outlines, 2d animation",
            StylePreset::Watercolor => {
                "watercolor painting, soft wash, blended colors, paper texture"
            }
            StylePreset::Fantasy => "fantasy art, epic, magical, glowing, detailed illustration",
            StylePreset::Anime => "anime style, vibrant, Japanese animation, cel-shaded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_serializes_one_field_only() {
        let text = serde_json::to_value(Part::text("hello")).unwrap();
        assert_eq!(text, serde_json::json!({ "text": "hello" }));

        let img = serde_json::to_value(Part::image(InlineImage {
            data: "QUJD".to_string(),
            mime_type: "image/png".to_string(),
        }))
        .unwrap();
        assert_eq!(
            img,
            serde_json::json!({ "inlineData": { "data": "QUJD", "mimeType": "image/png" } })
        );
    }

    #[test]
    fn response_extracts_first_image() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "caption" },
                    { "inlineData": { "data": "Zm9v", "mimeType": "image/webp" } }
                ]},
                "finishReason": "STOP"
            }]
        });
        let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let image = resp.first_image().unwrap();
        assert_eq!(image.mime_type, "image/webp");
        assert_eq!(resp.text().as_deref(), Some("caption"));
    }

    #[test]
    fn style_preset_ids_round_trip() {
        for preset in StylePreset::ALL {
            assert_eq!(StylePreset::from_id(preset.id()), preset);
        }
        assert_eq!(StylePreset::from_id("garbage"), StylePreset::None);
    }
}
