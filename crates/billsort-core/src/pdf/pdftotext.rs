//! Text extraction through the poppler `pdftotext` utility.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use super::{Result, TextExtractor};
use crate::error::PdfError;

/// Runs `<command> <file> -` and reads the text from its standard output.
#[derive(Debug, Clone)]
pub struct PdftotextExtractor {
    command: String,
}

impl PdftotextExtractor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    fn unavailable(&self, err: std::io::Error) -> PdfError {
        PdfError::ToolUnavailable {
            tool: self.command.clone(),
            reason: err.to_string(),
        }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new("pdftotext")
    }
}

impl TextExtractor for PdftotextExtractor {
    fn name(&self) -> &str {
        "pdftotext"
    }

    fn probe(&self) -> Result<()> {
        // Only the spawn matters; some versions exit non-zero for -v.
        Command::new(&self.command)
            .arg("-v")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.unavailable(e))?;
        debug!("using {}", self.command);
        Ok(())
    }

    fn extract_text(&self, path: &Path) -> Result<String> {
        trace!("running {} on {}", self.command, path.display());

        let output = Command::new(&self.command)
            .arg(path)
            .arg("-")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| self.unavailable(e))?;

        if !output.status.success() {
            return Err(PdfError::TextExtraction(format!(
                "{} failed ({})",
                self.command, output.status
            )));
        }

        String::from_utf8(output.stdout).map_err(|_| PdfError::NotUtf8)
    }
}
