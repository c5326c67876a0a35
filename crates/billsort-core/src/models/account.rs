//! Account configuration entity.

use chrono::format::{Item, StrftimeItems};
use regex::{Regex, RegexBuilder};

use crate::error::ConfigError;
use crate::placement;

/// Uncompiled account record, as read from or written to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSpec {
    /// Account identifier.
    pub account_name: String,
    /// Regexes that must all be found in the document text.
    pub match_patterns: Vec<String>,
    /// Regex whose first capture group is the date string.
    pub date_pattern: String,
    /// strptime-style format of the captured date string.
    pub date_format: String,
    /// Regex whose first capture group is a standalone year.
    pub year_pattern: Option<String>,
    /// Shift the resolved date one calendar month back.
    pub adjust_month_back: bool,
    /// Per-year subdirectory, defaults to the account name.
    pub output_subdirectory: Option<String>,
    /// Filename template, defaults to `"<account> %Y-%m.pdf"`.
    pub output_template: Option<String>,
}

/// Compiled date extraction rule of an account.
#[derive(Debug, Clone)]
pub struct DateRule {
    /// Case-insensitive, dot-all date pattern.
    pub pattern: Regex,
    /// strptime-style format of the captured date string.
    pub format: String,
    /// Plain year pattern, only consulted when the format has no year.
    pub year_pattern: Option<Regex>,
    /// Shift the resolved date one calendar month back.
    pub adjust_month_back: bool,
}

/// A validated account configuration, immutable once loaded.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    spec: AccountSpec,
    match_patterns: Vec<Regex>,
    date_rule: DateRule,
}

impl AccountConfig {
    /// Validate a record and compile its regexes.
    ///
    /// Every invariant of an account is checked here so that a bad record is
    /// rejected at load time and never reaches the classifier.
    pub fn new(spec: AccountSpec) -> Result<Self, ConfigError> {
        if spec.account_name.trim().is_empty() {
            return Err(ConfigError::MissingId);
        }

        if spec.match_patterns.is_empty() {
            return Err(ConfigError::NoMatchPatterns);
        }

        let match_patterns = spec
            .match_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidRegex {
                    field: "match",
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if spec.date_pattern.is_empty() {
            return Err(ConfigError::MissingField("regex"));
        }
        if spec.date_format.is_empty() {
            return Err(ConfigError::MissingField("parsing-format"));
        }

        let date_pattern = RegexBuilder::new(&spec.date_pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| ConfigError::InvalidRegex {
                field: "date",
                pattern: spec.date_pattern.clone(),
                source,
            })?;
        require_capture_group("date", &date_pattern)?;

        if !is_valid_format(&spec.date_format) {
            return Err(ConfigError::InvalidDateFormat(spec.date_format.clone()));
        }

        let year_pattern = match spec.year_pattern.as_deref() {
            Some(p) if !p.is_empty() => {
                let re = Regex::new(p).map_err(|source| ConfigError::InvalidRegex {
                    field: "year",
                    pattern: p.to_string(),
                    source,
                })?;
                require_capture_group("year", &re)?;
                Some(re)
            }
            _ => None,
        };

        if let Some(template) = &spec.output_template {
            if !placement::is_valid_template(template) {
                return Err(ConfigError::InvalidTemplate(template.clone()));
            }
        }

        let date_rule = DateRule {
            pattern: date_pattern,
            format: spec.date_format.clone(),
            year_pattern,
            adjust_month_back: spec.adjust_month_back,
        };

        Ok(Self {
            spec,
            match_patterns,
            date_rule,
        })
    }

    pub fn account_name(&self) -> &str {
        &self.spec.account_name
    }

    pub fn match_patterns(&self) -> &[Regex] {
        &self.match_patterns
    }

    pub fn date_rule(&self) -> &DateRule {
        &self.date_rule
    }

    pub fn output_subdirectory(&self) -> Option<&str> {
        self.spec.output_subdirectory.as_deref()
    }

    pub fn output_template(&self) -> Option<&str> {
        self.spec.output_template.as_deref()
    }
}

fn require_capture_group(field: &'static str, re: &Regex) -> Result<(), ConfigError> {
    // captures_len counts the implicit whole-match group
    if re.captures_len() < 2 {
        return Err(ConfigError::MissingCaptureGroup {
            field,
            pattern: re.as_str().to_string(),
        });
    }
    Ok(())
}

/// Whether every `%` directive in `format` is one chrono understands.
pub(crate) fn is_valid_format(format: &str) -> bool {
    StrftimeItems::new(format).all(|item| !matches!(item, Item::Error))
}
