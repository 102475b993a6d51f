//! Shared utility functions.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Convert a slug to title case.
///
/// Splits on `-` and `_`, capitalizes each word.
/// "getting-started" -> "Getting Started"
/// "api_reference" -> "Api Reference"
pub fn title_case(s: &str) -> String {
    s.split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a front matter date.
///
/// Accepts full RFC 3339 timestamps ("2019-05-28T22:12:03.284Z") and plain
/// dates ("2021-03-01"), which are taken as midnight UTC.
pub fn parse_date(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
        return Some(date_time);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

/// Format a date for display, e.g. "March 01, 2021".
pub fn display_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%B %d, %Y").to_string()
}
