//! PDF to text conversion.

mod extractor;
mod pdftotext;

pub use extractor::BuiltinExtractor;
pub use pdftotext::PdftotextExtractor;

use std::path::Path;

use crate::error::PdfError;
use crate::models::config::{ExtractionConfig, ExtractorKind};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Converts a document into plain text for classification.
pub trait TextExtractor {
    /// Short backend name, for diagnostics.
    fn name(&self) -> &str;

    /// Check once, before any document is handled, that the backend can run.
    fn probe(&self) -> Result<()>;

    /// Extract the full text of the document at `path`.
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Build the extractor selected by `config`.
pub fn create_extractor(config: &ExtractionConfig) -> Box<dyn TextExtractor> {
    match config.backend {
        ExtractorKind::Pdftotext => Box::new(PdftotextExtractor::new(&config.pdftotext_command)),
        ExtractorKind::Builtin => Box::new(BuiltinExtractor::new()),
    }
}

/// Whether `path` names a PDF document, judged by its extension.
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
