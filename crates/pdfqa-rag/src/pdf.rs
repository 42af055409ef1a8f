//! PDF text extraction.
//!
//! Uses pdf-extract on a blocking task; the pages' text comes back in page
//! order as one string.

use async_trait::async_trait;
use tracing::debug;

use pdfqa_core::{Error, Result};

/// How far into a file the `%PDF-` marker may appear
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Turns raw document bytes into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String>;
}

/// Extractor for PDF files
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Whether the bytes carry a PDF header near the start of the file
    pub fn looks_like_pdf(bytes: &[u8]) -> bool {
        let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
        window.windows(5).any(|w| w == b"%PDF-")
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String> {
        if !Self::looks_like_pdf(&bytes) {
            return Err(Error::Extraction("File is not a PDF".to_string()));
        }

        let size = bytes.len();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| Error::Extraction(format!("PDF extraction task failed: {e}")))?
            .map_err(|e| Error::Extraction(format!("PDF extraction failed: {e}")))?;

        debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}
