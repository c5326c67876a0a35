//! Bill date extraction and year disambiguation.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{Months, NaiveDate};
use tracing::{debug, warn};

use crate::error::DateError;
use crate::models::account::{AccountConfig, DateRule};

/// Year information found in a parsed date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsedYear {
    /// A year with century (`%Y`, or `%C` with `%y`).
    Full(i32),
    /// A year without century (`%y`).
    TwoDigit(i32),
    /// The format carries no year at all.
    Missing,
}

impl ParsedYear {
    fn from_parsed(parsed: &Parsed) -> Self {
        match (parsed.year(), parsed.year_div_100(), parsed.year_mod_100()) {
            (Some(year), _, _) => ParsedYear::Full(year),
            (None, Some(century), Some(rest)) => ParsedYear::Full(century * 100 + rest),
            (None, Some(century), None) => ParsedYear::Full(century * 100),
            (None, None, Some(rest)) => ParsedYear::TwoDigit(rest),
            (None, None, None) => ParsedYear::Missing,
        }
    }
}

/// Resolve the bill date of `text` for `account`.
///
/// `run_year` is the year the run started in; it fills in the year when
/// neither the date string nor the account's year pattern provides one.
pub fn resolve_date(
    account: &AccountConfig,
    text: &str,
    run_year: i32,
) -> Result<NaiveDate, DateError> {
    let rule = account.date_rule();

    let datestr = rule
        .pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(DateError::NotFound)?;

    debug!(
        "date matched for account '{}': '{}'",
        account.account_name(),
        datestr
    );

    let parsed = parse_date_string(datestr, &rule.format)?;

    // A year is either complete, missing its century, or absent altogether.
    let year = match ParsedYear::from_parsed(&parsed) {
        ParsedYear::Full(year) if (0..100).contains(&year) => 2000 + year,
        ParsedYear::Full(year) => year,
        ParsedYear::TwoDigit(year) => 2000 + year,
        ParsedYear::Missing => implied_year(rule, text, run_year),
    };

    let date = build_date(&parsed, year).ok_or_else(|| DateError::Parse {
        datestr: datestr.to_string(),
        format: rule.format.clone(),
        reason: format!("no such date in {year}"),
    })?;

    let date = if rule.adjust_month_back {
        shift_month_back(date)
    } else {
        date
    };

    debug!("bill date for account '{}': {}", account.account_name(), date);
    Ok(date)
}

/// Parse `datestr` against a strptime-style `format` without requiring the
/// result to be a complete date.
fn parse_date_string(datestr: &str, format: &str) -> Result<Parsed, DateError> {
    let mut parsed = Parsed::new();
    format::parse(&mut parsed, datestr, StrftimeItems::new(format)).map_err(|e| {
        DateError::Parse {
            datestr: datestr.to_string(),
            format: format.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(parsed)
}

fn implied_year(rule: &DateRule, text: &str, run_year: i32) -> i32 {
    if let Some(year_pattern) = &rule.year_pattern {
        match year_pattern.captures(text).and_then(|caps| caps.get(1)) {
            Some(m) => match m.as_str().trim().parse::<i32>() {
                Ok(year) => {
                    let year = if (0..100).contains(&year) { 2000 + year } else { year };
                    debug!("year matched: '{}'", year);
                    return year;
                }
                Err(_) => warn!("year string '{}' is not a number", m.as_str()),
            },
            None => debug!("year string not found"),
        }
    }

    debug!("year implied: '{}'", run_year);
    run_year
}

fn build_date(parsed: &Parsed, year: i32) -> Option<NaiveDate> {
    match (parsed.month(), parsed.day(), parsed.ordinal()) {
        (None, None, Some(ordinal)) => NaiveDate::from_yo_opt(year, ordinal),
        (month, day, _) => NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1)),
    }
}

/// Move `date` one calendar month back, clamping the day to the end of
/// the shorter month.
pub fn shift_month_back(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(1)).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::AccountSpec;
    use pretty_assertions::assert_eq;

    fn account(date_pattern: &str, date_format: &str) -> AccountSpec {
        AccountSpec {
            account_name: "acme".to_string(),
            match_patterns: vec!["Acme".to_string()],
            date_pattern: date_pattern.to_string(),
            date_format: date_format.to_string(),
            ..Default::default()
        }
    }

    fn resolve(spec: AccountSpec, text: &str, run_year: i32) -> Result<NaiveDate, DateError> {
        resolve_date(&AccountConfig::new(spec).unwrap(), text, run_year)
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_year() {
        let spec = account(r"Date: (\d+/\d+/\d{4})", "%m/%d/%Y");
        assert_eq!(resolve(spec, "Date: 03/15/2021", 2030), Ok(ymd(2021, 3, 15)));
    }

    #[test]
    fn test_two_digit_year() {
        let spec = account(r"Date: (\S+)", "%m/%d/%y");
        assert_eq!(resolve(spec, "Date: 03/15/24", 2030), Ok(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_two_digit_years_map_to_2000s() {
        for yy in [0, 1, 24, 68, 69, 70, 99] {
            let spec = account(r"Date: (\S+)", "%m/%d/%y");
            let text = format!("Date: 01/02/{yy:02}");
            assert_eq!(resolve(spec, &text, 1999), Ok(ymd(2000 + yy, 1, 2)), "yy = {yy}");
        }
    }

    #[test]
    fn test_short_full_year_gets_century() {
        let spec = account(r"Date: (\S+)", "%m/%d/%Y");
        assert_eq!(resolve(spec, "Date: 03/15/24", 2030), Ok(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_missing_year_uses_run_year() {
        let spec = account(r"Statement date: (\d+/\d+)", "%m/%d");
        assert_eq!(
            resolve(spec, "Acme Electric\nStatement date: 04/07\n", 2023),
            Ok(ymd(2023, 4, 7))
        );
    }

    #[test]
    fn test_explicit_1900_is_a_real_year() {
        let spec = account(r"Date: (\S+)", "%Y-%m-%d");
        assert_eq!(resolve(spec, "Date: 1900-05-01", 2023), Ok(ymd(1900, 5, 1)));

        let spec = account(r"Date: (\S+)", "%m-%d");
        assert_eq!(resolve(spec, "Date: 05-01", 2023), Ok(ymd(2023, 5, 1)));
    }

    #[test]
    fn test_missing_year_from_year_pattern() {
        let mut spec = account(r"Statement date: (\d+/\d+)", "%m/%d");
        spec.year_pattern = Some(r"Billing year (\d+)".to_string());

        let text = "Billing year 2019\nStatement date: 04/07";
        assert_eq!(resolve(spec.clone(), text, 2023), Ok(ymd(2019, 4, 7)));

        let text = "Billing year 19\nStatement date: 04/07";
        assert_eq!(resolve(spec.clone(), text, 2023), Ok(ymd(2019, 4, 7)));

        let text = "Statement date: 04/07";
        assert_eq!(resolve(spec, text, 2023), Ok(ymd(2023, 4, 7)));
    }

    #[test]
    fn test_year_pattern_ignored_when_format_has_year() {
        let mut spec = account(r"Date: (\S+)", "%m/%d/%Y");
        spec.year_pattern = Some(r"Billing year (\d+)".to_string());
        assert_eq!(
            resolve(spec, "Billing year 2019 Date: 04/07/2021", 2023),
            Ok(ymd(2021, 4, 7))
        );
    }

    #[test]
    fn test_year_pattern_is_not_dot_all() {
        let mut spec = account(r"Statement date: (\d+/\d+)", "%m/%d");
        spec.year_pattern = Some(r"Year.(\d{4})".to_string());
        let text = "Year\n2019\nStatement date: 04/07";
        assert_eq!(resolve(spec, text, 2023), Ok(ymd(2023, 4, 7)));
    }

    #[test]
    fn test_non_numeric_year_falls_back() {
        let mut spec = account(r"Statement date: (\d+/\d+)", "%m/%d");
        spec.year_pattern = Some(r"Billing year (\w+)".to_string());
        let text = "Billing year unknown\nStatement date: 04/07";
        assert_eq!(resolve(spec, text, 2023), Ok(ymd(2023, 4, 7)));
    }

    #[test]
    fn test_date_pattern_case_insensitive_across_lines() {
        let spec = account(r"statement date:.*?(\d+/\d+/\d+)", "%m/%d/%Y");
        let text = "STATEMENT DATE:\n\n  12/01/2022";
        assert_eq!(resolve(spec, text, 2030), Ok(ymd(2022, 12, 1)));
    }

    #[test]
    fn test_month_names() {
        let spec = account(r"Period ending (\w+ \d+, \d{4})", "%B %d, %Y");
        assert_eq!(
            resolve(spec, "Period ending january 31, 2024", 2030),
            Ok(ymd(2024, 1, 31))
        );

        let spec = account(r"Billed (\w+ \d{4})", "%b %Y");
        assert_eq!(resolve(spec, "Billed Sep 2022", 2030), Ok(ymd(2022, 9, 1)));
    }

    #[test]
    fn test_time_fields_parse_but_are_ignored() {
        let spec = account(r"Generated (.+?) UTC", "%Y-%m-%d %H:%M");
        assert_eq!(
            resolve(spec, "Generated 2022-11-05 23:59 UTC", 2030),
            Ok(ymd(2022, 11, 5))
        );
    }

    #[test]
    fn test_day_of_year() {
        let spec = account(r"Day (\d+/\d+)", "%Y/%j");
        assert_eq!(resolve(spec, "Day 2024/060", 2030), Ok(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_not_found_is_distinct_from_parse_error() {
        let spec = account(r"Statement date: (\d+/\d+)", "%m/%d");
        assert_eq!(resolve(spec.clone(), "no date here", 2023), Err(DateError::NotFound));

        let spec = account(r"Statement date: (\S+)", "%m/%d");
        let err = resolve(spec, "Statement date: 2023-04-07", 2023).unwrap_err();
        assert!(matches!(err, DateError::Parse { ref datestr, .. } if datestr == "2023-04-07"));
    }

    #[test]
    fn test_unconverted_data_is_parse_error() {
        let spec = account(r"Date: (\S+)", "%m/%d");
        assert!(matches!(
            resolve(spec, "Date: 04/07/2023", 2023),
            Err(DateError::Parse { .. })
        ));
    }

    #[test]
    fn test_impossible_date_is_parse_error() {
        let spec = account(r"Date: (\S+)", "%m/%d");
        assert!(matches!(
            resolve(spec.clone(), "Date: 02/30", 2024),
            Err(DateError::Parse { .. })
        ));

        // Feb 29 exists once the implied year is known to be a leap year.
        assert_eq!(resolve(spec.clone(), "Date: 02/29", 2024), Ok(ymd(2024, 2, 29)));
        assert!(resolve(spec, "Date: 02/29", 2023).is_err());
    }

    #[test]
    fn test_optional_group_not_participating_is_not_found() {
        let spec = account(r"Date:(?: (\d+/\d+))?", "%m/%d");
        assert_eq!(resolve(spec, "Date:", 2023), Err(DateError::NotFound));
    }

    #[test]
    fn test_month_back() {
        let mut spec = account(r"Statement date: (\d+/\d+)", "%m/%d");
        spec.adjust_month_back = true;
        assert_eq!(
            resolve(spec, "Acme Electric\nStatement date: 04/07\n", 2023),
            Ok(ymd(2023, 3, 7))
        );
    }

    #[test]
    fn test_month_back_clamps_day() {
        let mut spec = account(r"Date: (\S+)", "%Y-%m-%d");
        spec.adjust_month_back = true;
        assert_eq!(resolve(spec.clone(), "Date: 2024-03-31", 2030), Ok(ymd(2024, 2, 29)));
        assert_eq!(resolve(spec.clone(), "Date: 2023-03-31", 2030), Ok(ymd(2023, 2, 28)));
        assert_eq!(resolve(spec, "Date: 2023-05-31", 2030), Ok(ymd(2023, 4, 30)));
    }

    #[test]
    fn test_month_back_crosses_year() {
        let mut spec = account(r"Date: (\S+)", "%m/%d/%y");
        spec.adjust_month_back = true;
        assert_eq!(resolve(spec, "Date: 01/15/00", 2030), Ok(ymd(1999, 12, 15)));
    }

    #[test]
    fn test_shift_month_back() {
        assert_eq!(shift_month_back(ymd(2024, 3, 31)), ymd(2024, 2, 29));
        assert_eq!(shift_month_back(ymd(2023, 3, 31)), ymd(2023, 2, 28));
        assert_eq!(shift_month_back(ymd(2023, 1, 31)), ymd(2022, 12, 31));
        assert_eq!(shift_month_back(ymd(2023, 7, 31)), ymd(2023, 6, 30));
        assert_eq!(shift_month_back(ymd(2023, 6, 15)), ymd(2023, 5, 15));
    }
}
