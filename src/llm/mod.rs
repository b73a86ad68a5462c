//! Natural-language classification capability.
//!
//! The pipeline never talks to a model API directly; it goes through the
//! [`Classifier`] trait so tests can substitute canned replies. One
//! concrete adapter wraps the Gemini `generateContent` HTTP API.

mod gemini;

use async_trait::async_trait;

use crate::error::LlmError;

pub use gemini::GeminiClassifier;

/// Best-effort text generation service used for command classification.
///
/// Replies are free text that is merely *expected* to contain JSON; the
/// parser survives any shape.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
