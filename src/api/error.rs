//! Error surface of the remote API layer.
//!
//! Two shapes reach the UI: `Rejected` carries an already user-readable
//! interpretation of a structured refusal (safety block, recitation, text
//! instead of pixels) and is shown verbatim; `Transport` wraps HTTP, JSON,
//! and I/O failures behind a recognizable prefix.

use thiserror::Error;

use crate::api::types::GenerateContentResponse;
use crate::t;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A user-readable refusal; display as-is.
    #[error("{0}")]
    Rejected(String),
    /// Anything mechanical: connection, status, decode.
    #[error("Gemini API Error: {0}")]
    Transport(String),
}

impl ApiError {
    /// The message as the UI should show it.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// The message with the transport prefix stripped, for contexts that
    /// re-wrap it ("Failed to generate image: ...").
    pub fn bare_message(&self) -> String {
        match self {
            ApiError::Rejected(msg) => msg.clone(),
            ApiError::Transport(msg) => msg.clone(),
        }
    }
}

/// True when a message reads like a safety refusal, in either locale.
pub fn looks_blocked(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("blocked")
        || lower.contains("bloqueado")
        || lower.contains("safety")
        || lower.contains("segurança")
}

/// Interpret a 200 response that carried no image. Checks run in priority
/// order: prompt-level block, candidate finish reason, text-instead-of-image,
/// missing data, and finally an unknown-error fallback.
pub fn friendly_message(response: &GenerateContentResponse) -> String {
    if let Some(feedback) = &response.prompt_feedback
        && let Some(reason) = &feedback.block_reason
    {
        return match reason.as_str() {
            "SAFETY" => t!("api.blocked_safety"),
            "OTHER" => t!("api.blocked_other"),
            other => t!("api.blocked_reason", reason = other),
        };
    }

    if let Some(candidates) = response.candidates.as_deref()
        && let Some(candidate) = candidates.first()
        && let Some(reason) = &candidate.finish_reason
        && reason != "STOP"
        && reason != "FINISH_REASON_UNSPECIFIED"
    {
        return match reason.as_str() {
            "SAFETY" | "IMAGE_SAFETY" => t!("api.finish_safety"),
            "RECITATION" => t!("api.finish_recitation"),
            "MAX_TOKENS" => t!("api.finish_max_tokens"),
            "OTHER" | "IMAGE_OTHER" => t!("api.finish_other"),
            other => t!("api.finish_reason", reason = other),
        };
    }

    if response.candidates.is_some() && response.first_image().is_none() {
        if let Some(text) = response.text() {
            return t!("api.text_instead", text = text.trim());
        }
        return t!("api.no_data");
    }

    t!("api.unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n;

    fn response(body: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn prompt_block_outranks_everything() {
        i18n::init();
        i18n::set_language("en");
        let resp = response(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" },
            "candidates": [{ "finishReason": "RECITATION" }]
        }));
        let msg = friendly_message(&resp);
        assert!(msg.contains("blocked for safety reasons"));
    }

    #[test]
    fn unknown_finish_reason_is_quoted_verbatim() {
        i18n::init();
        i18n::set_language("en");
        let resp = response(serde_json::json!({
            "candidates": [{ "finishReason": "SPII" }]
        }));
        let msg = friendly_message(&resp);
        assert!(msg.contains("(Reason: SPII)"));
    }

    #[test]
    fn text_instead_of_image_is_surfaced() {
        i18n::init();
        i18n::set_language("en");
        let resp = response(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "  I cannot draw that.  " }] },
                "finishReason": "STOP"
            }]
        }));
        let msg = friendly_message(&resp);
        assert!(msg.contains("returned text instead"));
        assert!(msg.contains("\"I cannot draw that.\""));
    }

    #[test]
    fn empty_candidates_without_feedback_is_no_data() {
        i18n::init();
        i18n::set_language("en");
        let resp = response(serde_json::json!({ "candidates": [] }));
        let msg = friendly_message(&resp);
        assert!(msg.contains("No image data was returned"));
    }

    #[test]
    fn transport_errors_carry_the_prefix() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), "Gemini API Error: connection refused");
        assert_eq!(err.bare_message(), "connection refused");
    }

    #[test]
    fn blocked_detection_spans_locales() {
        assert!(looks_blocked("Request was BLOCKED by filters"));
        assert!(looks_blocked("Solicitação bloqueada por segurança"));
        assert!(!looks_blocked("connection refused"));
    }
}
