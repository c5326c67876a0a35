//! Application settings for the sorting pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Main settings for billsort.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillsortConfig {
    /// Default locations.
    pub paths: PathsConfig,

    /// Text extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Default directories, used when neither a flag nor an environment
/// variable names one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the account XML records.
    pub accounts_dir: Option<PathBuf>,

    /// Root of the bill archive.
    pub output_dir: Option<PathBuf>,
}

/// Text extraction backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorKind {
    /// The poppler `pdftotext` utility.
    #[default]
    Pdftotext,
    /// In-process extraction with lopdf and pdf-extract.
    Builtin,
}

/// Text extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which backend converts PDFs to text.
    pub backend: ExtractorKind,

    /// Command used by the pdftotext backend.
    pub pdftotext_command: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorKind::Pdftotext,
            pdftotext_command: "pdftotext".to_string(),
        }
    }
}

impl BillsortConfig {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Settings(format!("{}: {}", path.display(), e)))
    }

    /// Load settings from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Settings(e.to_string()))?;
        std::fs::write(path, format!("{content}\n")).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
