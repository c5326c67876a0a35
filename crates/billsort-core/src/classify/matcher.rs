//! Required-pattern matching for one account.

use regex::Regex;
use tracing::trace;

use crate::models::account::AccountConfig;

/// First pattern of `account` that is not found anywhere in `text`.
///
/// Patterns are searched in declaration order and the scan stops at the
/// first miss.
pub fn first_mismatch<'a>(account: &'a AccountConfig, text: &str) -> Option<&'a Regex> {
    account.match_patterns().iter().find(|pattern| {
        let found = pattern.is_match(text);
        trace!(
            "account '{}': pattern '{}' {}",
            account.account_name(),
            pattern.as_str(),
            if found { "found" } else { "not found" }
        );
        !found
    })
}

/// Whether `text` satisfies every match pattern of `account`.
pub fn matches(account: &AccountConfig, text: &str) -> bool {
    first_mismatch(account, text).is_none()
}
