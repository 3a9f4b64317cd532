//! Pipeline tuning parameters.
//!
//! Everything is defaulted, so an empty (or absent) TOML file yields a working
//! configuration. [`RagConfig::load`] always validates before returning.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3";
pub const DEFAULT_GENERATION_MODEL: &str = "qwen2.5:1.5b-instruct";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RagConfig {
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub models: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum tokens (whitespace-delimited words) per chunk.
    pub chunk_size: usize,
    /// Tokens shared by consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            chunk_overlap: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to be considered relevant.
    pub similarity_floor: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 2,
            similarity_floor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// How many of the retrieved chunks go into the prompt (must be <= top_k).
    pub context_chunks: usize,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            context_chunks: 2,
            max_new_tokens: 512,
            temperature: 0.3,
            top_p: 0.9,
            repetition_penalty: 1.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Directory for the parser's scratch file. System temp dir when unset.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            temp_dir: None,
        }
    }
}

impl RagConfig {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::config("CONFIG_READ_FAILED", "Failed to read configuration file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let cfg = Self::from_toml_str(&raw).map_err(|e| {
            let details = match e.details.as_deref() {
                Some(d) => format!("path={}; {d}", path.display()),
                None => format!("path={}", path.display()),
            };
            e.with_details(details)
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, AppError> {
        let cfg: RagConfig = toml::from_str(raw).map_err(|e| {
            AppError::config("CONFIG_PARSE_FAILED", "Failed to parse configuration")
                .with_details(e.to_string())
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let c = &self.chunking;
        if c.chunk_size == 0 {
            return Err(invalid("chunking.chunk_size must be greater than zero"));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(invalid("chunking.chunk_overlap must be smaller than chunk_size")
                .with_details(format!(
                    "chunk_size={}; chunk_overlap={}",
                    c.chunk_size, c.chunk_overlap
                )));
        }

        let r = &self.retrieval;
        if r.top_k == 0 {
            return Err(invalid("retrieval.top_k must be at least 1"));
        }
        if !(-1.0..=1.0).contains(&r.similarity_floor) {
            return Err(invalid("retrieval.similarity_floor must be within [-1, 1]")
                .with_details(format!("similarity_floor={}", r.similarity_floor)));
        }

        let g = &self.generation;
        if g.context_chunks == 0 || g.context_chunks > r.top_k {
            return Err(invalid("generation.context_chunks must be between 1 and retrieval.top_k")
                .with_details(format!(
                    "context_chunks={}; top_k={}",
                    g.context_chunks, r.top_k
                )));
        }
        if g.max_new_tokens == 0 {
            return Err(invalid("generation.max_new_tokens must be greater than zero"));
        }
        if !(g.temperature > 0.0) {
            return Err(invalid("generation.temperature must be positive"));
        }
        if !(g.top_p > 0.0 && g.top_p <= 1.0) {
            return Err(invalid("generation.top_p must be within (0, 1]"));
        }
        if !(g.repetition_penalty > 0.0) {
            return Err(invalid("generation.repetition_penalty must be positive"));
        }

        let m = &self.models;
        if m.embedding_model.trim().is_empty() || m.generation_model.trim().is_empty() {
            return Err(invalid("models.embedding_model and models.generation_model are required"));
        }
        if m.base_url.trim().is_empty() {
            return Err(invalid("models.base_url is required"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> AppError {
    AppError::config("CONFIG_INVALID", message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = RagConfig::from_toml_str("").expect("parse");
        assert_eq!(cfg, RagConfig::default());
        assert_eq!(cfg.chunking.chunk_size, 256);
        assert_eq!(cfg.chunking.chunk_overlap, 15);
        assert_eq!(cfg.retrieval.top_k, 2);
        assert_eq!(cfg.generation.max_new_tokens, 512);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = RagConfig::from_toml_str(
            r#"
[retrieval]
top_k = 4

[models]
generation_model = "llama3.2"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.retrieval.top_k, 4);
        assert_eq!(cfg.retrieval.similarity_floor, 0.5);
        assert_eq!(cfg.models.generation_model, "llama3.2");
        assert_eq!(cfg.models.embedding_model, DEFAULT_EMBEDDING_MODEL);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        let err = RagConfig::from_toml_str("[chunking]\nchunk_size = 10\nchunk_overlap = 10\n")
            .expect_err("should reject");
        assert_eq!(err.kind, ErrorKind::Config);
        assert_eq!(err.code, "CONFIG_INVALID");
    }

    #[test]
    fn rejects_context_chunks_above_top_k() {
        let mut cfg = RagConfig::default();
        cfg.generation.context_chunks = 3;
        assert!(cfg.validate().is_err());
        cfg.retrieval.top_k = 3;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_sampling() {
        let mut cfg = RagConfig::default();
        cfg.generation.top_p = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = RagConfig::default();
        cfg.generation.temperature = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = RagConfig::default();
        cfg.retrieval.similarity_floor = 2.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = RagConfig::from_toml_str("[chunking\nchunk_size = ").expect_err("should fail");
        assert_eq!(err.code, "CONFIG_PARSE_FAILED");
        assert!(err.is(ErrorKind::Config));
    }
}
