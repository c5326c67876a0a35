//! In-process text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::{Result, TextExtractor};
use crate::error::PdfError;

/// Text extractor that needs no external tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinExtractor;

impl BuiltinExtractor {
    /// Create a new builtin extractor.
    pub fn new() -> Self {
        Self
    }

    /// Load a PDF, decrypting it when it uses the empty password.
    ///
    /// Returns the bytes pdf-extract should read.
    fn prepare(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        if !doc.is_encrypted() {
            return Ok(data.to_vec());
        }

        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
        Ok(decrypted)
    }

    /// Extract the text of a PDF held in memory.
    pub fn extract_text_from_mem(&self, data: &[u8]) -> Result<String> {
        let data = self.prepare(data)?;

        // pdf-extract panics on some malformed fonts
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&data)
        }));

        match extracted {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => Err(PdfError::TextExtraction(
                "PDF text extraction aborted".to_string(),
            )),
        }
    }
}

impl TextExtractor for BuiltinExtractor {
    fn name(&self) -> &str {
        "builtin"
    }

    fn probe(&self) -> Result<()> {
        Ok(())
    }

    fn extract_text(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        let text = self.extract_text_from_mem(&data)?;
        debug!("{}: extracted {} chars", path.display(), text.len());
        Ok(text)
    }
}
