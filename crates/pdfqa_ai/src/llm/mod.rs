use pdfqa_core::config::GenerationConfig;
use pdfqa_core::error::AppError;
use serde::{Deserialize, Serialize};

/// Fixed sampling configuration applied to every generation call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingOptions {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl From<&GenerationConfig> for SamplingOptions {
    fn from(cfg: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: cfg.max_new_tokens,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            repetition_penalty: cfg.repetition_penalty,
        }
    }
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

/// Text-generation collaborator. Returns one candidate continuation; the
/// output may include an echo of the prompt.
pub trait Llm: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        sampling: &SamplingOptions,
    ) -> Result<String, AppError>;
}

pub mod ollama_llm;

pub use ollama_llm::OllamaLlm;
