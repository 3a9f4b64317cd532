use pdfqa_core::error::AppError;

/// Embedding-model collaborator. Must be deterministic for a given model and
/// input, and return vectors of one fixed dimensionality per model.
pub trait Embedder: Send + Sync {
    fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, AppError>;
}

pub mod ollama_embed;

pub use ollama_embed::OllamaEmbedder;
