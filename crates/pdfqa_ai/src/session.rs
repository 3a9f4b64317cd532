//! Process-wide collaborators and per-session state.
//!
//! [`Services`] is built once at startup and shared read-only by every
//! session; dropping it releases the model clients. Each [`Session`] owns at
//! most one [`EmbeddingIndex`], so sessions never see each other's documents.

use pdfqa_core::config::RagConfig;
use pdfqa_core::error::{AppError, ErrorKind};
use pdfqa_core::ingest::{ingest_document, PdfExtractor, TextExtractor};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::answer::{generate_answer, Answer};
use crate::embeddings::{Embedder, OllamaEmbedder};
use crate::index::{EmbeddingIndex, IndexBuildInput, IndexStatus};
use crate::llm::{Llm, OllamaLlm, SamplingOptions};
use crate::ollama::OllamaClient;
use crate::retrieve::retrieve;

pub const PROCESS_DOCUMENT_FIRST: &str = "Please process a PDF document first";

pub struct Services {
    pub extractor: Box<dyn TextExtractor>,
    pub embedder: Box<dyn Embedder>,
    pub llm: Box<dyn Llm>,
}

impl Services {
    pub fn new(
        extractor: Box<dyn TextExtractor>,
        embedder: Box<dyn Embedder>,
        llm: Box<dyn Llm>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            llm,
        }
    }

    /// PDF extractor plus Ollama-backed models, after checking the endpoint is up.
    pub fn local(cfg: &RagConfig) -> Result<Self, AppError> {
        let client = OllamaClient::new(&cfg.models.base_url)?;
        client.health_check()?;
        log::info!(
            "model endpoint {} is up (embedding={}, generation={})",
            client.base_url(),
            cfg.models.embedding_model,
            cfg.models.generation_model
        );

        let extractor = match cfg.models.temp_dir.as_ref() {
            Some(dir) => PdfExtractor::with_temp_dir(dir.clone()),
            None => PdfExtractor::new(),
        };
        Ok(Self::new(
            Box::new(extractor),
            Box::new(OllamaEmbedder::new(client.clone())),
            Box::new(OllamaLlm::new(client)),
        ))
    }
}

#[derive(Debug, Default)]
pub struct Session {
    index: Option<EmbeddingIndex>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest `bytes` and build a fresh index, replacing any previous one.
    ///
    /// On failure the session is left without an index.
    pub fn process_document(
        &mut self,
        services: &Services,
        cfg: &RagConfig,
        bytes: &[u8],
    ) -> Result<IndexStatus, AppError> {
        self.index = None;

        let document = ingest_document(services.extractor.as_ref(), bytes, &cfg.chunking)?;
        let built_at = OffsetDateTime::now_utc().format(&Rfc3339).ok();
        let index = EmbeddingIndex::build(
            services.embedder.as_ref(),
            document,
            IndexBuildInput {
                model: cfg.models.embedding_model.clone(),
                built_at,
            },
        )?;

        let status = index.status();
        self.index = Some(index);
        Ok(status)
    }

    pub fn answer_question(
        &self,
        services: &Services,
        cfg: &RagConfig,
        question: &str,
    ) -> Result<Answer, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::invalid_input(
                "QUESTION_REQUIRED",
                "Please enter a question",
            ));
        }
        let index = self.index.as_ref().ok_or_else(|| {
            AppError::new(
                ErrorKind::IndexUnavailable,
                "INDEX_NOT_READY",
                PROCESS_DOCUMENT_FIRST,
            )
        })?;

        let retrieved = retrieve(
            index,
            services.embedder.as_ref(),
            question,
            cfg.retrieval.top_k,
            cfg.retrieval.similarity_floor,
        )?;

        generate_answer(
            services.llm.as_ref(),
            &cfg.models.generation_model,
            &SamplingOptions::from(&cfg.generation),
            &retrieved,
            question,
            cfg.generation.context_chunks,
        )
    }

    pub fn status(&self) -> IndexStatus {
        self.index
            .as_ref()
            .map(EmbeddingIndex::status)
            .unwrap_or_else(IndexStatus::not_ready)
    }

    pub fn index(&self) -> Option<&EmbeddingIndex> {
        self.index.as_ref()
    }

    pub fn clear(&mut self) {
        self.index = None;
    }
}
