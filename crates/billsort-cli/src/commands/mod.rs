//! Subcommands and the option resolution they share.

pub mod accounts;
pub mod config;
pub mod explain;
pub mod sort;
pub mod text;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::ValueEnum;

use billsort_core::models::config::{BillsortConfig, ExtractorKind};
use billsort_core::pdf::{create_extractor, TextExtractor};
use billsort_core::store::{self, LoadedAccounts};

/// Environment variable naming the account configuration directory.
pub const CONFIG_DIR_ENV: &str = "CLASSIFY_BILLS_CONFIG_DIRECTORY";

/// Environment variable naming the archive root.
pub const OUTPUT_DIR_ENV: &str = "CLASSIFY_BILLS_OUTPUT_DIRECTORY";

/// Account directory used when nothing else names one.
const DEFAULT_ACCOUNTS_DIR: &str = "~/.classify_bills.conf.d";

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExtractorArg {
    /// The poppler pdftotext utility
    Pdftotext,
    /// In-process extraction, no external tools
    Builtin,
}

impl From<ExtractorArg> for ExtractorKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Pdftotext => ExtractorKind::Pdftotext,
            ExtractorArg::Builtin => ExtractorKind::Builtin,
        }
    }
}

pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billsort")
        .join("config.json")
}

/// Load settings from `--settings`, or from the default location when it
/// exists.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<BillsortConfig> {
    let settings = match path {
        Some(path) => BillsortConfig::from_file(path)?,
        None => BillsortConfig::load_or_default(&default_settings_path())?,
    };
    Ok(settings)
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// The account directory: flag or environment, then settings, then the
/// default.
pub fn resolve_accounts_dir(flag: Option<PathBuf>, settings: &BillsortConfig) -> PathBuf {
    let dir = flag
        .or_else(|| settings.paths.accounts_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ACCOUNTS_DIR));
    expand_tilde(&dir)
}

/// The archive root: flag or environment, then settings. It must exist.
pub fn resolve_output_dir(
    flag: Option<PathBuf>,
    settings: &BillsortConfig,
) -> anyhow::Result<PathBuf> {
    let Some(dir) = flag.or_else(|| settings.paths.output_dir.clone()) else {
        anyhow::bail!(
            "Destination directory not specified (use --output-dir or {})",
            OUTPUT_DIR_ENV
        );
    };

    let dir = expand_tilde(&dir);
    if !dir.is_dir() {
        anyhow::bail!("Destination directory '{}' does not exist.", dir.display());
    }
    Ok(dir)
}

/// Load every account in `dir`, which must exist.
pub fn load_accounts(dir: &Path) -> anyhow::Result<LoadedAccounts> {
    if !dir.is_dir() {
        anyhow::bail!("Configuration directory '{}' does not exist.", dir.display());
    }
    Ok(store::load_directory(dir)?)
}

/// Build the configured extractor and make sure it can run.
pub fn build_extractor(
    settings: &BillsortConfig,
    backend: Option<ExtractorArg>,
) -> anyhow::Result<Box<dyn TextExtractor>> {
    let mut extraction = settings.extraction.clone();
    if let Some(backend) = backend {
        extraction.backend = backend.into();
    }

    let extractor = create_extractor(&extraction);
    extractor
        .probe()
        .with_context(|| format!("{} backend is unavailable", extractor.name()))?;
    Ok(extractor)
}

/// Name used to label a document in diagnostics.
pub fn short_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
