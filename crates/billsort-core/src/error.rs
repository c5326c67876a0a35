//! Error types for the billsort-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating account configurations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The record file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The XML record is not well formed.
    #[error("{}: malformed XML: {reason}", .path.display())]
    Xml { path: PathBuf, reason: String },

    /// A legacy JSON document could not be decoded.
    #[error("malformed legacy configuration: {0}")]
    Legacy(#[from] serde_json::Error),

    /// The account has no identifier.
    #[error("no id specified")]
    MissingId,

    /// The account has no usable match patterns.
    #[error("malformed or missing match patterns")]
    NoMatchPatterns,

    /// The date extraction element is absent.
    #[error("date extraction information is missing")]
    MissingDateExtraction,

    /// A required field of the date extraction rule is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A regular expression failed to compile.
    #[error("invalid {field} regex '{pattern}': {source}")]
    InvalidRegex {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A date or year regex has no capture group to take the value from.
    #[error("{field} regex '{pattern}' has no capture group")]
    MissingCaptureGroup { field: &'static str, pattern: String },

    /// The date parsing format contains an unknown directive.
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),

    /// The output template contains an unknown directive.
    #[error("invalid output template '{0}'")]
    InvalidTemplate(String),

    /// A boolean attribute carries something other than a boolean.
    #[error("invalid value '{value}' for {attribute}")]
    InvalidFlag { attribute: &'static str, value: String },

    /// The configuration directory holds no record files.
    #[error("directory '{}' contains no config files", .0.display())]
    NoConfigFiles(PathBuf),

    /// Every record in the configuration directory was rejected.
    #[error("no valid account configurations in '{}'", .0.display())]
    NoValidAccounts(PathBuf),

    /// The glob used to discover record files is invalid.
    #[error("invalid config file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The application settings file could not be read or written.
    #[error("settings error: {0}")]
    Settings(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The extraction tool cannot be run at all. Fatal for the whole run.
    #[error("cannot run {tool} (not installed?): {reason}")]
    ToolUnavailable { tool: String, reason: String },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The extracted text is not valid UTF-8.
    #[error("extracted text is not valid UTF-8")]
    NotUtf8,

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// I/O error while reading the document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfError {
    /// Whether the failure concerns the extraction environment rather than
    /// one document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PdfError::ToolUnavailable { .. })
    }
}

/// Reasons a matched account yields no bill date.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The date pattern does not occur in the text.
    #[error("date string not found")]
    NotFound,

    /// The date pattern occurred but its capture does not fit the format.
    #[error("failed to parse date string '{datestr}' using format '{format}': {reason}")]
    Parse {
        datestr: String,
        format: String,
        reason: String,
    },
}

/// Errors computing the destination of a document.
#[derive(Error, Debug)]
pub enum PlacementError {
    /// The template cannot be expanded against a date.
    #[error("invalid output template '{0}'")]
    InvalidTemplate(String),
}

/// Errors while filing a document into the archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Something other than a directory occupies the destination directory path.
    #[error("destination {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Creating a directory or moving a file failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
