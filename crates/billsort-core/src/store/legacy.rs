//! Legacy JSON account configurations.
//!
//! Older installations kept accounts as JSON objects:
//!
//! ```json
//! {
//!     "name": "acme-electric",
//!     "matches-all": ["Acme Electric"],
//!     "date-extractor": {
//!         "regexp": "Statement date: (\\d+/\\d+)",
//!         "format": "%m/%d",
//!         "adjust-month-back": true
//!     }
//! }
//! ```
//!
//! A document holds one such object, an array of them, or an object with an
//! `accounts` array. The presence of `adjust-month-back` enables the shift
//! whatever its value.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::models::account::AccountSpec;

#[derive(Debug, Deserialize)]
struct LegacyAccount {
    name: String,

    #[serde(rename = "matches-all", default)]
    matches_all: Vec<String>,

    #[serde(rename = "date-extractor")]
    date_extractor: LegacyDateExtractor,
}

#[derive(Debug, Deserialize)]
struct LegacyDateExtractor {
    regexp: String,

    format: String,

    #[serde(rename = "year-extractor-regexp", default)]
    year_extractor_regexp: Option<String>,

    #[serde(rename = "adjust-month-back", default)]
    adjust_month_back: Option<Value>,
}

impl From<LegacyAccount> for AccountSpec {
    fn from(legacy: LegacyAccount) -> Self {
        let date = legacy.date_extractor;
        AccountSpec {
            account_name: legacy.name,
            match_patterns: legacy
                .matches_all
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect(),
            date_pattern: date.regexp,
            date_format: date.format,
            year_pattern: date.year_extractor_regexp.filter(|p| !p.is_empty()),
            adjust_month_back: date.adjust_month_back.is_some(),
            output_subdirectory: None,
            output_template: None,
        }
    }
}

/// Decode a legacy JSON document into account records.
pub fn parse_legacy(json: &str) -> Result<Vec<AccountSpec>, ConfigError> {
    let document: Value = serde_json::from_str(json)?;

    let accounts: Vec<LegacyAccount> = match document {
        Value::Array(_) => serde_json::from_value(document)?,
        Value::Object(mut map) if map.contains_key("accounts") => {
            let list = map.remove("accounts").unwrap_or(Value::Null);
            serde_json::from_value(list)?
        }
        other => vec![serde_json::from_value(other)?],
    };

    Ok(accounts.into_iter().map(AccountSpec::from).collect())
}

/// Read a legacy JSON document from `path`.
pub fn read_legacy(path: &Path) -> Result<Vec<AccountSpec>, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_legacy(&json)
}

/// File name for an account's XML record, safe on every platform.
pub fn record_file_name(account_name: &str) -> String {
    let stem: String = account_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('.');

    if stem.is_empty() {
        "account.xml".to_string()
    } else {
        format!("{stem}.xml")
    }
}
