//! Blocking HTTP client for the Gemini `generateContent` endpoint.
//!
//! All calls run on worker threads (see `app.rs`), so the blocking reqwest
//! client fits: the UI thread never waits on the network. Requests carry no
//! timeout and cannot be cancelled; the owning busy-flag stays set until the
//! call resolves.

use crate::api::error::{self, ApiError};
use crate::api::types::{
    AspectRatio, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    InlineImage, Part, Tool,
};
use crate::{log_err, log_info, t};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Model for every image generation and edit.
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";
/// Model for the text-only helpers (enhance, analyze).
pub const TEXT_MODEL: &str = "gemini-2.5-flash";

const ENHANCE_SYSTEM_INSTRUCTION: &str = "Based on the user's query and up-to-date search results, generate a single, highly detailed, and visually descriptive paragraph. This paragraph will be used as a prompt for an AI image generator. Focus on creating a rich scene by describing objects, atmosphere, lighting, composition, and specific visual details. Do not ask questions or offer options; provide a complete, ready-to-use prompt.";

// The product ships in Portuguese; the reverse-prompt instruction asks for a
// Portuguese prompt on purpose.
const ANALYZE_SYSTEM_INSTRUCTION: &str = "\
Você é um especialista em Engenharia de Prompt para IA e Análise de Imagens.
Sua tarefa é analisar a imagem fornecida e escrever um prompt de texto altamente detalhado EM PORTUGUÊS que possa ser usado para recriar esta imagem exata usando um gerador de imagens (como o Gemini ou Stable Diffusion).

Concentre-se fortemente nos seguintes aspectos para descrever a imagem:
1. **Assunto**: Aparência detalhada, roupas, expressão facial, pose exata e ação.
2. **Câmera e Ângulo**: Especifique o ângulo da câmera (ex: ângulo baixo, vista aérea, close-up, plano geral), tipo de lente sugerida e profundidade de campo (fundo desfocado ou nítido).
3. **Iluminação**: Descreva a iluminação (ex: cinematográfica, natural, volumétrica, luz de estúdio, hora dourada, contraste).
4. **Estilo**: O estilo artístico visual (ex: fotorrealista, pintura a óleo, renderização 3D, cyberpunk, anime, fotografia analógica).
5. **Ambiente**: Detalhes do fundo, atmosfera, cores predominantes e texturas.

Saída APENAS a string bruta do prompt em Português. Não inclua texto introdutório como \"Aqui está o prompt\". O texto deve ser descritivo e pronto para ser usado como input de geração.";

const ANALYZE_USER_TEXT: &str =
    "Analise esta imagem e crie um prompt de geração detalhado em português.";

pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from the `GEMINI_API_KEY` (or legacy `API_KEY`)
    /// environment variable.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| {
                ApiError::Transport("GEMINI_API_KEY environment variable not set".to_string())
            })?;
        // no timeout: generation can run for minutes and is never cancelled
        let http = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { http, api_key })
    }

    fn post(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiError> {
        let url = format!("{BASE_URL}/{model}:generateContent");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log_err!("{} returned {}: {}", model, status, body);
            return Err(ApiError::Transport(format!("HTTP {status}: {body}")));
        }
        response
            .json::<GenerateContentResponse>()
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// Generate (or edit) an image. Reference images are sent first, in the
    /// order given, followed by the fully composed text prompt.
    pub fn generate(
        &self,
        prompt: &str,
        images: &[InlineImage],
        aspect: AspectRatio,
        negative: Option<&str>,
    ) -> Result<InlineImage, ApiError> {
        let request = build_generate_request(prompt, images, aspect, negative);
        log_info!(
            "generate: {} reference image(s), aspect {}",
            images.len(),
            aspect.as_str()
        );

        let response = self.post(IMAGE_MODEL, &request)?;
        match response.first_image() {
            Some(image) => Ok(image.clone()),
            None => Err(ApiError::Rejected(error::friendly_message(&response))),
        }
    }

    /// Rewrite a short prompt into a detailed one, grounded in web search.
    pub fn enhance_prompt(&self, prompt: &str) -> Result<String, ApiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            generation_config: None,
            system_instruction: Some(Content {
                parts: vec![Part::text(ENHANCE_SYSTEM_INSTRUCTION)],
            }),
            tools: Some(vec![Tool::google_search()]),
        };

        let response = self.post(TEXT_MODEL, &request)?;
        response
            .text()
            .ok_or_else(|| ApiError::Transport(t!("api.no_enhanced")))
    }

    /// Describe an image as a ready-to-use generation prompt.
    pub fn analyze_image(&self, image: &InlineImage) -> Result<String, ApiError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::image(image.clone()), Part::text(ANALYZE_USER_TEXT)],
            }],
            // low temperature keeps the description precise
            generation_config: Some(GenerationConfig {
                response_modalities: None,
                temperature: Some(0.4),
            }),
            system_instruction: Some(Content {
                parts: vec![Part::text(ANALYZE_SYSTEM_INSTRUCTION)],
            }),
            tools: None,
        };

        let response = self.post(TEXT_MODEL, &request).map_err(|e| {
            log_err!("analyze_image failed: {}", e);
            ApiError::Rejected(t!("err.analyze_failed"))
        })?;
        match response.text() {
            Some(text) => Ok(text.trim().to_string()),
            None => Err(ApiError::Rejected(t!("err.analyze_failed"))),
        }
    }
}

/// Compose the final text prompt: user text, then the aspect-ratio clause,
/// then the exclusion clause when a negative prompt is present.
pub(crate) fn compose_prompt(
    prompt: &str,
    aspect: AspectRatio,
    negative: Option<&str>,
) -> String {
    let mut composed = prompt.to_string();
    composed.push_str(aspect.clause());
    if let Some(negative) = negative
        && !negative.is_empty()
    {
        composed.push_str(&format!(" . Exclude: {negative}"));
    }
    composed
}

fn build_generate_request(
    prompt: &str,
    images: &[InlineImage],
    aspect: AspectRatio,
    negative: Option<&str>,
) -> GenerateContentRequest {
    let mut parts: Vec<Part> = images.iter().cloned().map(Part::image).collect();
    parts.push(Part::text(compose_prompt(prompt, aspect, negative)));

    GenerateContentRequest {
        contents: vec![Content { parts }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            temperature: None,
        }),
        system_instruction: None,
        tools: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_gets_aspect_clause() {
        let composed = compose_prompt("a red fox", AspectRatio::Wide, None);
        assert_eq!(composed, "a red fox . Wide cinematic aspect ratio 16:9.");
    }

    #[test]
    fn negative_clause_comes_last() {
        let composed = compose_prompt("a red fox", AspectRatio::Square, Some("blurry, text"));
        assert_eq!(
            composed,
            "a red fox . Square aspect ratio 1:1. . Exclude: blurry, text"
        );
    }

    #[test]
    fn empty_negative_is_skipped() {
        let composed = compose_prompt("castle", AspectRatio::Tall, Some(""));
        assert_eq!(composed, "castle . Tall portrait aspect ratio 9:16.");
    }

    #[test]
    fn reference_images_precede_the_text_part() {
        let images = vec![
            InlineImage {
                data: "QQ==".to_string(),
                mime_type: "image/png".to_string(),
            },
            InlineImage {
                data: "Qg==".to_string(),
                mime_type: "image/jpeg".to_string(),
            },
        ];
        let request = build_generate_request("merge these", &images, AspectRatio::Tall, None);

        let parts = &request.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().data, "QQ==");
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, "Qg==");
        assert!(parts[2].text.as_ref().unwrap().starts_with("merge these"));

        let config = request.generation_config.unwrap();
        assert_eq!(config.response_modalities.unwrap(), vec!["IMAGE"]);
    }
}
