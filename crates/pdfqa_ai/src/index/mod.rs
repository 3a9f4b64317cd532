//! In-memory embedding index over the chunks of one document.
//!
//! An index is built in one pass and never updated; processing another
//! document means building a new one.

use pdfqa_core::error::{AppError, ErrorKind};
use pdfqa_core::ingest::{Chunk, IngestedDocument};
use serde::{Deserialize, Serialize};

use crate::embeddings::Embedder;
use crate::retrieve::similarity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStatus {
    pub ready: bool,
    pub model: Option<String>,
    pub dims: Option<u32>,
    pub chunk_count: u32,
    pub document_sha256: Option<String>,
    pub built_at: Option<String>,
}

impl IndexStatus {
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            model: None,
            dims: None,
            chunk_count: 0,
            document_sha256: None,
            built_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexBuildInput {
    pub model: String,
    pub built_at: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct IndexedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
    pub norm: f32,
}

#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    model: String,
    dims: u32,
    document_sha256: String,
    built_at: Option<String>,
    pub(crate) entries: Vec<IndexedChunk>,
}

impl EmbeddingIndex {
    pub fn build(
        embedder: &dyn Embedder,
        document: IngestedDocument,
        input: IndexBuildInput,
    ) -> Result<Self, AppError> {
        if document.chunks.is_empty() {
            return Err(AppError::new(
                ErrorKind::IndexUnavailable,
                "INDEX_NOT_READY",
                "No chunks available; the document produced no text to index",
            ));
        }

        let mut dims: Option<u32> = None;
        let mut entries = Vec::with_capacity(document.chunks.len());
        for chunk in document.chunks {
            let vector = embedder.embed(&input.model, &chunk.text).map_err(|e| {
                AppError::model("AI_EMBEDDINGS_FAILED", "Failed to compute embeddings")
                    .with_details(format!("ordinal={}; err={}", chunk.ordinal, e))
                    .with_retryable(e.retryable)
            })?;

            let this_dims = vector.len() as u32;
            match dims {
                Some(d) if d != this_dims => {
                    return Err(AppError::model(
                        "AI_INDEX_BUILD_FAILED",
                        "Embedding dimension mismatch across chunks",
                    )
                    .with_details(format!(
                        "expected={}; got={}; ordinal={}",
                        d, this_dims, chunk.ordinal
                    )));
                }
                Some(_) => {}
                None if this_dims == 0 => {
                    return Err(AppError::model(
                        "AI_INDEX_BUILD_FAILED",
                        "Embedding model returned an empty vector",
                    ));
                }
                None => dims = Some(this_dims),
            }

            let norm = similarity::l2_norm(&vector);
            if norm == 0.0 {
                log::warn!("chunk {} has a zero-norm embedding; it will never be retrieved", chunk.ordinal);
            }
            entries.push(IndexedChunk {
                chunk,
                vector,
                norm,
            });
        }

        let index = Self {
            model: input.model,
            dims: dims.unwrap_or_default(),
            document_sha256: document.document_sha256,
            built_at: input.built_at,
            entries,
        };
        log::info!(
            "built index: {} chunks, {} dims, model {}",
            index.len(),
            index.dims,
            index.model
        );
        Ok(index)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dims(&self) -> u32 {
        self.dims
    }

    pub fn document_sha256(&self) -> &str {
        &self.document_sha256
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }

    pub fn status(&self) -> IndexStatus {
        IndexStatus {
            ready: true,
            model: Some(self.model.clone()),
            dims: Some(self.dims),
            chunk_count: self.len() as u32,
            document_sha256: Some(self.document_sha256.clone()),
            built_at: self.built_at.clone(),
        }
    }
}
