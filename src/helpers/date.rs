//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use chrono_tz::Tz;

use crate::error::FormatError;
use crate::i18n::Strings;

/// Display pattern for publication dates ("15 Mar 2021")
pub const PUBLICATION_PATTERN: &str = "DD MMM YYYY";

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, the `+0000` offset form Prismic emits
/// (`2021-03-15T19:25:28+0000`) and bare `YYYY-MM-DD` dates (taken as UTC midnight).
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date);
    }
    if let Ok(date) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(date);
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}

/// Format a date using a Moment.js-style pattern with localized month names
///
/// Supported tokens: `YYYY`, `YY`, `MMM`, `MM`, `DD`, `HH`, `mm`, `ss`.
/// Anything else is copied through.
///
/// # Examples
/// ```ignore
/// format_date(&date, "DD MMM YYYY", &strings) // -> "15 Mar 2021"
/// ```
pub fn format_date(date: &NaiveDateTime, pattern: &str, strings: &Strings) -> String {
    const TOKENS: [&str; 8] = ["YYYY", "YY", "MMM", "MM", "DD", "HH", "mm", "ss"];

    let mut result = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while !rest.is_empty() {
        match TOKENS.iter().find(|t| rest.starts_with(**t)) {
            Some(token) => {
                match *token {
                    "YYYY" => result.push_str(&format!("{:04}", date.year())),
                    "YY" => result.push_str(&format!("{:02}", date.year().rem_euclid(100))),
                    "MMM" => result.push_str(strings.month_abbr(date.month())),
                    "MM" => result.push_str(&format!("{:02}", date.month())),
                    "DD" => result.push_str(&format!("{:02}", date.day())),
                    "HH" => result.push_str(&format!("{:02}", date.hour())),
                    "mm" => result.push_str(&format!("{:02}", date.minute())),
                    _ => result.push_str(&format!("{:02}", date.second())),
                }
                rest = &rest[token.len()..];
            }
            None => {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    result.push(c);
                }
                rest = chars.as_str();
            }
        }
    }

    result
}

/// Formats publication timestamps for display
#[derive(Debug, Clone)]
pub struct DateFormatter {
    strings: Strings,
    timezone: Option<Tz>,
    pattern: String,
}

impl DateFormatter {
    /// Create a formatter using the publication pattern
    pub fn new(strings: Strings, timezone: Option<Tz>) -> Self {
        Self {
            strings,
            timezone,
            pattern: PUBLICATION_PATTERN.to_string(),
        }
    }

    /// Format a nullable backend timestamp
    pub fn format(&self, value: Option<&str>) -> Result<String, FormatError> {
        let parsed = value.and_then(parse_timestamp).ok_or_else(|| FormatError {
            value: value.map(str::to_string),
        })?;

        let local = match self.timezone {
            Some(tz) => parsed.with_timezone(&tz).naive_local(),
            None => parsed.naive_local(),
        };

        Ok(format_date(&local, &self.pattern, &self.strings))
    }
}
