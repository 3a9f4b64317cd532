use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::AppError;

use super::TextExtractor;

/// Extracts text with `pdf-extract`, which reads from a path.
///
/// The bytes are written to a scratch file that is removed on every exit path:
/// explicitly after parsing, and by the drop guard if anything in between fails.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    temp_dir: Option<PathBuf>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temp_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: Some(dir.into()),
        }
    }

    fn scratch_file(&self) -> Result<NamedTempFile, AppError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("pdfqa-").suffix(".pdf");
        let created = match self.temp_dir.as_deref() {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        created.map_err(|e| {
            AppError::parse("PDF_TEMP_FAILED", "Failed to create temporary file for PDF parsing")
                .with_details(e.to_string())
        })
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::parse("PDF_PARSE_FAILED", "Uploaded file is empty"));
        }

        let mut tmp = self.scratch_file()?;
        tmp.write_all(bytes)
            .and_then(|_| tmp.flush())
            .map_err(|e| {
                AppError::parse("PDF_TEMP_FAILED", "Failed to write temporary PDF file")
                    .with_details(e.to_string())
            })?;

        let parsed = parse_path(tmp.path());

        if let Err(e) = tmp.close() {
            log::warn!("failed to remove temporary PDF file: {e}");
        }
        parsed
    }
}

fn parse_path(path: &Path) -> Result<String, AppError> {
    log::debug!("extracting text from {}", path.display());
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text(path))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(
            AppError::parse("PDF_PARSE_FAILED", "File is not a readable PDF document")
                .with_details(format!("{e:?}")),
        ),
        Err(_) => Err(AppError::parse(
            "PDF_PARSE_FAILED",
            "PDF parser aborted on malformed input",
        )),
    }
}
