//! Gemini REST client: image generation, prompt enhancement with search
//! grounding, and reverse-prompt image analysis.

pub mod client;
pub mod error;
pub mod types;

pub use client::GeminiClient;
pub use error::ApiError;
