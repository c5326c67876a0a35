//! Core library for sorting bill PDFs into a dated archive.
//!
//! This crate provides:
//! - Account configurations and their XML store (plus the legacy JSON format)
//! - PDF text extraction via `pdftotext` or in-process
//! - Classification: required-pattern matching and bill date resolution
//! - Archive placement with strftime templates and a `%Q` quarter directive
//! - Filing with dry-run support

pub mod archive;
pub mod classify;
pub mod error;
pub mod models;
pub mod pdf;
pub mod placement;
pub mod store;

pub use archive::{ArchiveOptions, Archiver, FileAction};
pub use classify::{Classification, Classifier, MatchOutcome};
pub use error::{ArchiveError, ConfigError, DateError, PdfError, PlacementError};
pub use models::{AccountConfig, AccountSpec, BillsortConfig, ExtractorKind};
pub use pdf::{create_extractor, TextExtractor};
pub use placement::{place, Placement};
pub use store::{load_directory, LoadedAccounts, RejectedRecord};
