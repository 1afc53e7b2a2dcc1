//! RFC 822 date formatting for `pubDate` and `lastBuildDate`.
//!
//! RSS 2.0 requires dates like `Sat, 15 Jun 2024 14:30:45 GMT`. Everything
//! is computed in UTC; naive inputs (no offset) are taken to already be UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use super::types::{FeedError, Timestamp};

/// Fixed-width RSS date layout. `%a`/`%b` are English abbreviations in chrono.
const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Years `%Y` renders as exactly four digits.
const FOUR_DIGIT_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Naive date-time layouts accepted for text timestamps, tried in order.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Formats a UTC instant as an RSS date.
pub fn format_rfc822(dt: &DateTime<Utc>) -> String {
    dt.format(RFC822_FORMAT).to_string()
}

/// Resolves and formats a timestamp.
///
/// # Errors
///
/// [`FeedError::InvalidDate`] if the timestamp does not resolve to a
/// representable point in time.
pub fn format_timestamp(ts: &Timestamp) -> Result<String, FeedError> {
    ts.to_utc().map(|dt| format_rfc822(&dt))
}

impl Timestamp {
    /// Resolves this timestamp to a UTC instant.
    ///
    /// Instants whose UTC year falls outside 0000..=9999 are rejected, since
    /// RSS dates carry a four-digit year.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, FeedError> {
        let resolved = match self {
            Timestamp::Utc(dt) => Some(*dt),
            Timestamp::Fixed(dt) => Some(dt.with_timezone(&Utc)),
            Timestamp::Unix(secs) => DateTime::from_timestamp(*secs, 0),
            Timestamp::Text(text) => parse_text(text),
        };

        resolved
            .filter(|dt| FOUR_DIGIT_YEARS.contains(&dt.year()))
            .ok_or_else(|| FeedError::InvalidDate(self.describe()))
    }

    /// The input as written, for error messages.
    fn describe(&self) -> String {
        match self {
            Timestamp::Utc(dt) => dt.to_rfc3339(),
            Timestamp::Fixed(dt) => dt.to_rfc3339(),
            Timestamp::Unix(secs) => secs.to_string(),
            Timestamp::Text(text) => text.clone(),
        }
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
