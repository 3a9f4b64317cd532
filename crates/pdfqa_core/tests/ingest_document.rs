use pdfqa_core::config::ChunkingConfig;
use pdfqa_core::error::{AppError, ErrorKind};
use pdfqa_core::ingest::{ingest_document, TextExtractor};
use pretty_assertions::assert_eq;

struct FixedText(&'static str);

impl TextExtractor for FixedText {
    fn extract(&self, _bytes: &[u8]) -> Result<String, AppError> {
        Ok(self.0.to_string())
    }
}

struct Failing;

impl TextExtractor for Failing {
    fn extract(&self, _bytes: &[u8]) -> Result<String, AppError> {
        Err(AppError::parse("PDF_PARSE_FAILED", "File is not a readable PDF document"))
    }
}

#[test]
fn produces_ordered_chunks_for_extracted_text() {
    let text = "Page one talks about rivers.\r\nPage two talks about mountains. And lakes.";
    let doc = ingest_document(
        &FixedText(text),
        b"%PDF-fake",
        &ChunkingConfig {
            chunk_size: 6,
            chunk_overlap: 1,
        },
    )
    .expect("ingest");

    assert_eq!(doc.document_sha256.len(), 64);
    assert!(doc.chunks.len() >= 2);
    let ordinals = doc.chunks.iter().map(|c| c.ordinal).collect::<Vec<_>>();
    assert_eq!(ordinals, (0..doc.chunks.len() as u32).collect::<Vec<_>>());
    assert!(doc.chunks.iter().all(|c| !c.text.contains('\r')));
    assert_eq!(doc.chunks[0].text, "Page one talks about rivers.");
}

#[test]
fn document_hash_depends_on_bytes_only() {
    let cfg = ChunkingConfig::default();
    let a = ingest_document(&FixedText("same text"), b"bytes-a", &cfg).unwrap();
    let b = ingest_document(&FixedText("same text"), b"bytes-b", &cfg).unwrap();
    assert_ne!(a.document_sha256, b.document_sha256);
    assert_eq!(a.chunks, b.chunks);
}

#[test]
fn whitespace_only_text_is_a_parse_error() {
    let err = ingest_document(&FixedText("  \n\n \u{c}"), b"%PDF-fake", &ChunkingConfig::default())
        .expect_err("no text");
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.code, "PDF_NO_TEXT");
}

#[test]
fn extractor_failure_is_propagated() {
    let err = ingest_document(&Failing, b"junk", &ChunkingConfig::default()).expect_err("fails");
    assert_eq!(err.kind, ErrorKind::Parse);
    assert_eq!(err.user_message(), "Error processing PDF: File is not a readable PDF document");
}

#[test]
fn char_count_is_taken_after_line_ending_normalisation() {
    let doc = ingest_document(&FixedText("Café\r\nnoir"), b"%PDF-fake", &ChunkingConfig::default())
        .expect("ingest");
    assert_eq!(doc.char_count, 9);
    assert_eq!(doc.chunks[0].text, "Café\nnoir");
}
