//! Document Ingestor: PDF bytes in, ordered overlapping chunks out.

pub mod chunking;
pub mod model;
pub mod pdf;

use crate::config::ChunkingConfig;
use crate::error::AppError;

pub use chunking::{chunk_text, normalize_text};
pub use model::{Chunk, IngestedDocument};
pub use pdf::PdfExtractor;

/// Seam for the document-text-extraction collaborator.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, AppError>;
}

pub fn ingest_document(
    extractor: &dyn TextExtractor,
    bytes: &[u8],
    cfg: &ChunkingConfig,
) -> Result<IngestedDocument, AppError> {
    let document_sha256 = chunking::sha256_hex(bytes);
    let raw = extractor.extract(bytes)?;
    let text = normalize_text(&raw);
    if text.trim().is_empty() {
        return Err(AppError::parse(
            "PDF_NO_TEXT",
            "PDF contains no extractable text",
        )
        .with_details(format!("document_sha256={document_sha256}")));
    }

    let chunks = chunk_text(&text, cfg);
    let char_count = text.chars().count();
    log::debug!(
        "ingested document {}: {} chars, {} chunks",
        &document_sha256[..12],
        char_count,
        chunks.len()
    );

    Ok(IngestedDocument {
        document_sha256,
        char_count: char_count as u64,
        chunks,
    })
}
