//! Destination directory and filename of a classified bill.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::error::PlacementError;
use crate::models::account::AccountConfig;

/// Non-standard template directive expanding to the calendar quarter.
pub const QUARTER_TOKEN: &str = "%Q";

/// Where a bill goes inside the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// `<base>/<year>/<subdirectory>`.
    pub directory: PathBuf,
    /// Expanded filename template.
    pub filename: String,
}

impl Placement {
    /// Full destination path.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Calendar quarter (1-4) of a month (1-12).
pub fn quarter(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Template used when an account has none: `"<account> %Y-%m.pdf"`.
pub fn default_template(account_name: &str) -> String {
    format!("{} %Y-%m.pdf", account_name.replace('%', "%%"))
}

/// Substitute the first `%Q`, then expand strftime directives against
/// `date` at midnight.
pub fn expand_template(template: &str, date: NaiveDate) -> Result<String, PlacementError> {
    let template = template.replacen(QUARTER_TOKEN, &format!("Q{}", quarter(date.month())), 1);

    let items: Vec<Item<'_>> = StrftimeItems::new(&template).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(PlacementError::InvalidTemplate(template.clone()));
    }

    // Time zone directives still fail to format without an offset.
    let midnight = date.and_time(NaiveTime::MIN);
    let mut filename = String::new();
    write!(filename, "{}", midnight.format_with_items(items.iter()))
        .map_err(|_| PlacementError::InvalidTemplate(template.clone()))?;
    Ok(filename)
}

/// Whether `template` can be expanded for any date.
pub fn is_valid_template(template: &str) -> bool {
    let sample = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    expand_template(template, sample).is_ok()
}

/// Compute the archive location of a bill of `account` dated `date`.
pub fn place(
    account: &AccountConfig,
    date: NaiveDate,
    base_output_dir: &Path,
) -> Result<Placement, PlacementError> {
    let subdirectory = account
        .output_subdirectory()
        .unwrap_or_else(|| account.account_name());

    let directory = base_output_dir
        .join(date.year().to_string())
        .join(subdirectory);

    let filename = match account.output_template() {
        Some(template) => expand_template(template, date)?,
        None => expand_template(&default_template(account.account_name()), date)?,
    };

    Ok(Placement {
        directory,
        filename,
    })
}
