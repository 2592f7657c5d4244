// src/services/extract.rs

//! Text extraction from downloaded documents.

use std::sync::Arc;

use crate::error::ExtractionError;
use crate::models::ExtractedText;

/// Converts document bytes into text lines.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Arc<T> {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        (**self).extract(bytes)
    }
}

/// Best-effort sniff for PDF bytes (magic header).
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Whole-document PDF extraction with `pdf-extract`. Every page is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        if !looks_like_pdf(bytes) {
            return Err(ExtractionError::NotPdf);
        }

        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Parse(e.to_string()))?;
        log::info!("Extracted {} characters of text", text.chars().count());

        Ok(ExtractedText::from_raw(&text))
    }
}

/// Treats the bytes as UTF-8 text. Used for plain-text menus and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractionError::Parse(format!("invalid UTF-8: {e}")))?;
        Ok(ExtractedText::from_raw(text))
    }
}

/// Run an extractor on the blocking pool.
///
/// PDF parsing is CPU bound and the parser may panic on malformed input; a
/// panic comes back as [`ExtractionError::Aborted`] instead of unwinding into
/// the caller.
pub async fn extract_blocking<E>(
    extractor: E,
    bytes: Vec<u8>,
) -> Result<ExtractedText, ExtractionError>
where
    E: TextExtractor + 'static,
{
    tokio::task::spawn_blocking(move || extractor.extract(&bytes))
        .await
        .map_err(|e| ExtractionError::Aborted(e.to_string()))?
}
