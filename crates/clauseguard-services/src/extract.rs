//! Text extraction from uploaded PDFs.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("PDF contains no extractable text")]
    NoText,

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Turns raw document bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: Bytes) -> Result<String, ExtractionError>;
}

/// PDF extraction backed by `pdf-extract`.
///
/// Parsing is CPU-bound and runs on the blocking pool. `pdf-extract` panics on
/// some malformed files; the panic is caught at the task boundary and surfaces
/// as [`ExtractionError::Task`]. This relies on the unwinding panic strategy,
/// so the release profile must not set `panic = "abort"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, data: Bytes) -> Result<String, ExtractionError> {
        let size = data.len();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
            .await
            .map_err(|e| ExtractionError::Task(e.to_string()))?
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;

        let text = normalize_text(&text);
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }

        tracing::debug!(pdf_bytes = size, text_chars = text.len(), "Extracted PDF text");
        Ok(text)
    }
}

/// Trim trailing whitespace per line and drop leading/trailing blank lines.
fn normalize_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
