//! Classification of extracted document text against account configurations.

pub mod dates;
pub mod matcher;

pub use dates::{resolve_date, shift_month_back};
pub use matcher::{first_mismatch, matches};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, error, trace};

use crate::error::DateError;
use crate::models::account::AccountConfig;

/// A document recognized as a bill of one account.
#[derive(Debug, Clone, Copy)]
pub struct Classification<'a> {
    /// The first account whose patterns and date rule succeeded.
    pub account: &'a AccountConfig,
    /// The resolved bill date.
    pub bill_date: NaiveDate,
}

/// Result of testing one account against one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// All patterns matched and the date resolved.
    Matched(NaiveDate),
    /// A required pattern is absent from the text.
    PatternMismatch { pattern: String },
    /// The patterns matched but the date pattern did not.
    DateNotFound,
    /// The date pattern matched but its text is not a date in the format.
    DateUnparsable(DateError),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }
}

/// Evaluate a single account against `text`, logging the outcome.
///
/// `filename` only labels the diagnostics.
pub fn evaluate(
    account: &AccountConfig,
    text: &str,
    run_year: i32,
    filename: &str,
) -> MatchOutcome {
    if let Some(pattern) = first_mismatch(account, text) {
        trace!(
            "{}: account '{}' rejected, pattern '{}' not found",
            filename,
            account.account_name(),
            pattern.as_str()
        );
        return MatchOutcome::PatternMismatch {
            pattern: pattern.as_str().to_string(),
        };
    }

    debug!(
        "{}: match successful for account '{}'",
        filename,
        account.account_name()
    );

    match resolve_date(account, text, run_year) {
        Ok(date) => {
            debug!("{}: bill date: {}", filename, date);
            MatchOutcome::Matched(date)
        }
        Err(DateError::NotFound) => {
            debug!("{}: date string not found", filename);
            MatchOutcome::DateNotFound
        }
        Err(err) => {
            error!("{}: {}", filename, err);
            MatchOutcome::DateUnparsable(err)
        }
    }
}

/// Find the first account in `accounts` that classifies `text`.
///
/// Accounts are tried in the given order and the scan stops at the first
/// success; an account whose date cannot be resolved counts as no match.
pub fn classify<'a>(
    text: &str,
    accounts: &'a [AccountConfig],
    run_year: i32,
    filename: &str,
) -> Option<Classification<'a>> {
    accounts.iter().find_map(|account| {
        match evaluate(account, text, run_year, filename) {
            MatchOutcome::Matched(bill_date) => Some(Classification { account, bill_date }),
            _ => None,
        }
    })
}

/// Ordered account list bound to the date the run started.
#[derive(Debug, Clone)]
pub struct Classifier {
    accounts: Vec<AccountConfig>,
    run_date: NaiveDate,
}

impl Classifier {
    /// Create a classifier. `run_date` is captured once per run so that every
    /// document in the run implies the same year.
    pub fn new(accounts: Vec<AccountConfig>, run_date: NaiveDate) -> Self {
        Self { accounts, run_date }
    }

    pub fn accounts(&self) -> &[AccountConfig] {
        &self.accounts
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    /// Year used when a document's date carries none.
    pub fn run_year(&self) -> i32 {
        self.run_date.year()
    }

    /// Classify one document's text.
    pub fn classify(&self, text: &str, filename: &str) -> Option<Classification<'_>> {
        classify(text, &self.accounts, self.run_year(), filename)
    }

    /// Evaluate every account against `text`, without stopping at the first
    /// match.
    pub fn explain(&self, text: &str, filename: &str) -> Vec<(&AccountConfig, MatchOutcome)> {
        self.accounts
            .iter()
            .map(|account| (account, evaluate(account, text, self.run_year(), filename)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::AccountSpec;
    use pretty_assertions::assert_eq;

    fn account(
        name: &str,
        patterns: &[&str],
        date_pattern: &str,
        date_format: &str,
    ) -> AccountConfig {
        AccountConfig::new(AccountSpec {
            account_name: name.to_string(),
            match_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            date_pattern: date_pattern.to_string(),
            date_format: date_format.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn classifier(accounts: Vec<AccountConfig>) -> Classifier {
        Classifier::new(accounts, ymd(2023, 9, 1))
    }

    const ACME_TEXT: &str =
        "Acme Electric\nAccount 42\nStatement date: 04/07\nAmount due: $12.00\n";

    #[test]
    fn test_end_to_end_missing_year() {
        let c = classifier(vec![account(
            "acme",
            &["Acme Electric"],
            r"Statement date: (\d+/\d+)",
            "%m/%d",
        )]);

        let result = c.classify(ACME_TEXT, "bill.pdf").unwrap();
        assert_eq!(result.account.account_name(), "acme");
        assert_eq!(result.bill_date, ymd(2023, 4, 7));
    }

    #[test]
    fn test_end_to_end_month_back() {
        let acct = AccountConfig::new(AccountSpec {
            account_name: "acme".to_string(),
            match_patterns: vec!["Acme Electric".to_string()],
            date_pattern: r"Statement date: (\d+/\d+)".to_string(),
            date_format: "%m/%d".to_string(),
            adjust_month_back: true,
            ..Default::default()
        })
        .unwrap();

        let c = classifier(vec![acct]);
        assert_eq!(c.classify(ACME_TEXT, "bill.pdf").unwrap().bill_date, ymd(2023, 3, 7));
    }

    #[test]
    fn test_first_match_wins() {
        let c = classifier(vec![
            account("gas", &["Acme Gas"], r"Date: (\S+)", "%m/%d"),
            account("electric", &["Acme Electric"], r"Statement date: (\S+)", "%m/%d"),
            account("generic", &["Acme"], r"Statement date: (\S+)", "%m/%d"),
        ]);

        let result = c.classify(ACME_TEXT, "bill.pdf").unwrap();
        assert_eq!(result.account.account_name(), "electric");
    }

    #[test]
    fn test_date_failures_continue_scan() {
        let c = classifier(vec![
            account("no-date", &["Acme"], r"Invoice date: (\S+)", "%m/%d"),
            account("bad-format", &["Acme"], r"Statement date: (\S+)", "%Y-%m-%d"),
            account("good", &["Acme"], r"Statement date: (\S+)", "%m/%d"),
        ]);

        let result = c.classify(ACME_TEXT, "bill.pdf").unwrap();
        assert_eq!(result.account.account_name(), "good");
    }

    #[test]
    fn test_unmatched() {
        let c = classifier(vec![account("water", &["City Water"], r"Date: (\S+)", "%m/%d")]);
        assert!(c.classify(ACME_TEXT, "bill.pdf").is_none());
        assert!(classifier(Vec::new()).classify(ACME_TEXT, "bill.pdf").is_none());
    }

    #[test]
    fn test_explain_reports_every_outcome() {
        let c = classifier(vec![
            account("water", &["City Water"], r"Date: (\S+)", "%m/%d"),
            account("no-date", &["Acme"], r"Invoice date: (\S+)", "%m/%d"),
            account("bad-format", &["Acme"], r"Statement date: (\S+)", "%Y-%m-%d"),
            account("good", &["Acme"], r"Statement date: (\S+)", "%m/%d"),
            account("also-good", &["Electric"], r"Statement date: (\S+)", "%m/%d"),
        ]);

        let outcomes: Vec<(String, MatchOutcome)> = c
            .explain(ACME_TEXT, "bill.pdf")
            .into_iter()
            .map(|(a, o)| (a.account_name().to_string(), o))
            .collect();

        assert_eq!(outcomes.len(), 5);
        assert_eq!(
            outcomes[0].1,
            MatchOutcome::PatternMismatch {
                pattern: "City Water".to_string()
            }
        );
        assert_eq!(outcomes[1].1, MatchOutcome::DateNotFound);
        assert!(matches!(outcomes[2].1, MatchOutcome::DateUnparsable(DateError::Parse { .. })));
        assert_eq!(outcomes[3].1, MatchOutcome::Matched(ymd(2023, 4, 7)));
        assert_eq!(outcomes[4].1, MatchOutcome::Matched(ymd(2023, 4, 7)));
    }

    #[test]
    fn test_classification_is_idempotent() {
        let c = classifier(vec![
            account("gas", &["Acme Gas"], r"Date: (\S+)", "%m/%d"),
            account("electric", &["Acme Electric"], r"Statement date: (\S+)", "%m/%d"),
        ]);

        let first = c.classify(ACME_TEXT, "bill.pdf").unwrap();
        let second = c.classify(ACME_TEXT, "bill.pdf").unwrap();
        assert_eq!(first.account.account_name(), second.account.account_name());
        assert_eq!(first.bill_date, second.bill_date);
    }

    #[test]
    fn test_run_year_is_fixed_per_classifier() {
        let acct = account("acme", &["Acme"], r"Statement date: (\S+)", "%m/%d");
        let c = Classifier::new(vec![acct], ymd(2019, 12, 31));
        assert_eq!(c.run_year(), 2019);
        assert_eq!(c.classify(ACME_TEXT, "bill.pdf").unwrap().bill_date, ymd(2019, 4, 7));
    }
}
