//! Account configuration store.
//!
//! Accounts live in a directory of XML records, one account per `*.xml`
//! file. Files are loaded in lexicographic order, which is also the order
//! the classifier tries accounts in.

pub mod legacy;
pub mod xml;

use std::path::{Path, PathBuf};

use glob::MatchOptions;
use tracing::{debug, error};

use crate::error::ConfigError;
use crate::models::account::AccountConfig;

pub use legacy::{parse_legacy, read_legacy, record_file_name};
pub use xml::{parse_account, read_account, to_xml, write_account};

/// A record file that failed to load.
#[derive(Debug)]
pub struct RejectedRecord {
    pub path: PathBuf,
    pub error: ConfigError,
}

/// Result of loading a configuration directory.
#[derive(Debug, Default)]
pub struct LoadedAccounts {
    /// Valid accounts in file-name order.
    pub accounts: Vec<AccountConfig>,
    /// Records that were skipped, with the reason.
    pub rejected: Vec<RejectedRecord>,
}

/// List the XML record files of `dir`, sorted by name.
///
/// Hidden files are not records.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let pattern = format!("{}/*.xml", glob::Pattern::escape(&dir.to_string_lossy()));

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut files: Vec<PathBuf> = glob::glob_with(&pattern, options)?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Load and validate one record file.
pub fn load_account(path: &Path) -> Result<AccountConfig, ConfigError> {
    AccountConfig::new(read_account(path)?)
}

/// Load every account in `dir`.
///
/// A bad record is logged and skipped. The load fails only when the
/// directory holds no record files or none of them is valid.
pub fn load_directory(dir: &Path) -> Result<LoadedAccounts, ConfigError> {
    let files = discover(dir)?;
    if files.is_empty() {
        return Err(ConfigError::NoConfigFiles(dir.to_path_buf()));
    }

    let mut loaded = LoadedAccounts::default();
    for path in files {
        match load_account(&path) {
            Ok(account) => {
                debug!(
                    "loaded account '{}' from {}",
                    account.account_name(),
                    path.display()
                );
                loaded.accounts.push(account);
            }
            Err(err) => {
                error!("Failed to load file {}: {}", path.display(), err);
                loaded.rejected.push(RejectedRecord { path, error: err });
            }
        }
    }

    if loaded.accounts.is_empty() {
        return Err(ConfigError::NoValidAccounts(dir.to_path_buf()));
    }

    Ok(loaded)
}
