//! XML account records.
//!
//! One file describes one account:
//!
//! ```xml
//! <account id="acme-electric">
//!     <naming subdirectory="Acme" template="Acme %Y-%m.pdf" />
//!     <match-all>
//!         <pattern regex="Acme Electric" />
//!     </match-all>
//!     <date-extraction regex="Statement date: (\d+/\d+)"
//!                      parsing-format="%m/%d"
//!                      adjust-month-back="true" />
//! </account>
//! ```

use std::path::Path;

use quick_xml::se::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::account::AccountSpec;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "account")]
struct AccountRecord {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    naming: Option<NamingRecord>,

    #[serde(rename = "match-all", default, skip_serializing_if = "Option::is_none")]
    match_all: Option<MatchAllRecord>,

    #[serde(rename = "date-extraction", default, skip_serializing_if = "Option::is_none")]
    date_extraction: Option<DateExtractionRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct NamingRecord {
    #[serde(rename = "@subdirectory", default, skip_serializing_if = "Option::is_none")]
    subdirectory: Option<String>,

    #[serde(rename = "@template", default, skip_serializing_if = "Option::is_none")]
    template: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MatchAllRecord {
    #[serde(rename = "pattern", default)]
    patterns: Vec<PatternRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PatternRecord {
    #[serde(rename = "@regex", default)]
    regex: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DateExtractionRecord {
    #[serde(rename = "@regex", default)]
    regex: Option<String>,

    #[serde(rename = "@parsing-format", default)]
    parsing_format: Option<String>,

    #[serde(rename = "@adjust-month-back", default, skip_serializing_if = "Option::is_none")]
    adjust_month_back: Option<String>,

    #[serde(rename = "@year-regex", default, skip_serializing_if = "Option::is_none")]
    year_regex: Option<String>,
}

impl AccountRecord {
    fn into_spec(self) -> Result<AccountSpec, ConfigError> {
        let account_name = self
            .id
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingId)?;

        let naming = self.naming.unwrap_or_default();

        // Empty regex attributes are placeholders, not patterns.
        let match_patterns: Vec<String> = self
            .match_all
            .map(|m| {
                m.patterns
                    .into_iter()
                    .filter_map(|p| p.regex)
                    .filter(|regex| !regex.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if match_patterns.is_empty() {
            return Err(ConfigError::NoMatchPatterns);
        }

        let date = self
            .date_extraction
            .ok_or(ConfigError::MissingDateExtraction)?;

        let adjust_month_back = match date.adjust_month_back.as_deref() {
            Some(value) => parse_flag("adjust-month-back", value)?,
            None => false,
        };

        Ok(AccountSpec {
            account_name,
            match_patterns,
            date_pattern: date.regex.unwrap_or_default(),
            date_format: date.parsing_format.unwrap_or_default(),
            year_pattern: date.year_regex,
            adjust_month_back,
            output_subdirectory: naming.subdirectory,
            output_template: naming.template,
        })
    }

    fn from_spec(spec: &AccountSpec) -> Self {
        let naming = if spec.output_subdirectory.is_some() || spec.output_template.is_some() {
            Some(NamingRecord {
                subdirectory: spec.output_subdirectory.clone(),
                template: spec.output_template.clone(),
            })
        } else {
            None
        };

        Self {
            id: Some(spec.account_name.clone()),
            naming,
            match_all: Some(MatchAllRecord {
                patterns: spec
                    .match_patterns
                    .iter()
                    .map(|regex| PatternRecord {
                        regex: Some(regex.clone()),
                    })
                    .collect(),
            }),
            date_extraction: Some(DateExtractionRecord {
                regex: Some(spec.date_pattern.clone()),
                parsing_format: Some(spec.date_format.clone()),
                adjust_month_back: spec.adjust_month_back.then(|| "true".to_string()),
                year_regex: spec.year_pattern.clone(),
            }),
        }
    }
}

fn parse_flag(attribute: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            attribute,
            value: value.to_string(),
        }),
    }
}

/// Parse an XML account record. `source` names the record in errors.
pub fn parse_account(xml: &str, source: &Path) -> Result<AccountSpec, ConfigError> {
    let record: AccountRecord = quick_xml::de::from_str(xml).map_err(|e| ConfigError::Xml {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    record.into_spec()
}

/// Read an XML account record from `path`.
pub fn read_account(path: &Path) -> Result<AccountSpec, ConfigError> {
    let xml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_account(&xml, path)
}

/// Render an account record as XML.
pub fn to_xml(spec: &AccountSpec) -> Result<String, ConfigError> {
    let mut xml = String::new();
    let mut serializer = Serializer::new(&mut xml);
    serializer.indent(' ', 4);
    AccountRecord::from_spec(spec)
        .serialize(serializer)
        .map_err(|e| ConfigError::Settings(format!("cannot serialize account: {e}")))?;
    xml.push('\n');
    Ok(xml)
}

/// Write an account record to `path`.
pub fn write_account(spec: &AccountSpec, path: &Path) -> Result<(), ConfigError> {
    let xml = to_xml(spec)?;
    std::fs::write(path, xml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FULL: &str = r#"<account id="acme-electric">
    <naming subdirectory="Acme" template="Acme %Y %Q.pdf" />
    <match-all>
        <pattern regex="Acme Electric" />
        <pattern regex="" />
        <pattern regex="Account #\d+" />
    </match-all>
    <date-extraction regex="Statement date: (\d+/\d+)"
                     parsing-format="%m/%d"
                     year-regex="Billing year (\d{4})"
                     adjust-month-back="true" />
</account>
"#;

    fn parse(xml: &str) -> Result<AccountSpec, ConfigError> {
        parse_account(xml, Path::new("test.xml"))
    }

    #[test]
    fn test_parse_full_record() {
        let spec = parse(FULL).unwrap();
        assert_eq!(
            spec,
            AccountSpec {
                account_name: "acme-electric".to_string(),
                match_patterns: vec!["Acme Electric".to_string(), r"Account #\d+".to_string()],
                date_pattern: r"Statement date: (\d+/\d+)".to_string(),
                date_format: "%m/%d".to_string(),
                year_pattern: Some(r"Billing year (\d{4})".to_string()),
                adjust_month_back: true,
                output_subdirectory: Some("Acme".to_string()),
                output_template: Some("Acme %Y %Q.pdf".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_minimal_record() {
        let xml = r#"<account id="water">
            <match-all><pattern regex="City Water" /></match-all>
            <date-extraction regex="Date: (\S+)" parsing-format="%m/%d/%Y" />
        </account>"#;

        let spec = parse(xml).unwrap();
        assert_eq!(spec.account_name, "water");
        assert!(!spec.adjust_month_back);
        assert!(spec.year_pattern.is_none());
        assert!(spec.output_subdirectory.is_none());
        assert!(spec.output_template.is_none());
    }

    #[test]
    fn test_missing_id() {
        let xml = r#"<account>
            <match-all><pattern regex="x" /></match-all>
            <date-extraction regex="(x)" parsing-format="%m" />
        </account>"#;
        assert!(matches!(parse(xml), Err(ConfigError::MissingId)));
    }

    #[test]
    fn test_missing_patterns() {
        let xml = r#"<account id="a">
            <match-all><pattern regex="" /></match-all>
            <date-extraction regex="(x)" parsing-format="%m" />
        </account>"#;
        assert!(matches!(parse(xml), Err(ConfigError::NoMatchPatterns)));

        let xml = r#"<account id="a">
            <date-extraction regex="(x)" parsing-format="%m" />
        </account>"#;
        assert!(matches!(parse(xml), Err(ConfigError::NoMatchPatterns)));
    }

    #[test]
    fn test_missing_date_extraction() {
        let xml = r#"<account id="a">
            <match-all><pattern regex="x" /></match-all>
        </account>"#;
        assert!(matches!(parse(xml), Err(ConfigError::MissingDateExtraction)));
    }

    #[test]
    fn test_flag_values() {
        assert!(parse_flag("f", "true").unwrap());
        assert!(parse_flag("f", "YES").unwrap());
        assert!(parse_flag("f", "1").unwrap());
        assert!(!parse_flag("f", "false").unwrap());
        assert!(!parse_flag("f", "").unwrap());
        assert!(matches!(
            parse_flag("f", "maybe"),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            parse("<account id=\"a\"><match-all>"),
            Err(ConfigError::Xml { .. })
        ));
    }

    #[test]
    fn test_written_record_reads_back() {
        let spec = parse(FULL).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.xml");

        write_account(&spec, &path).unwrap();
        assert_eq!(read_account(&path).unwrap(), spec);
    }

    #[test]
    fn test_written_record_escapes_markup() {
        let spec = AccountSpec {
            account_name: "a&b".to_string(),
            match_patterns: vec![r#"Total <"due">"#.to_string()],
            date_pattern: "(x)".to_string(),
            date_format: "%m".to_string(),
            ..Default::default()
        };

        let xml = to_xml(&spec).unwrap();
        assert!(xml.starts_with("<account"));
        assert_eq!(parse(&xml).unwrap(), spec);
    }
}
