//! Best-effort conversion of the date strings found on search pages.
//!
//! Providers print dates as relative phrases ("3 hours ago"), a handful of
//! absolute layouts, or not at all. [`DateNormalizer::normalize`] walks these
//! in a fixed order and never fails: text it cannot read is given the
//! configured fallback age, or left undated when no fallback is configured.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::collapse_whitespace;

/// `<n> <unit>` or `a/an <unit>`, e.g. "5 mins", "an hour", "2h".
static RELATIVE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:(\d+)\s*|\b(an?)\s+)(minutes?|mins?|hours?|hrs?|h|days?|d|weeks?|wks?|w|months?|mo)\b",
    )
    .expect("relative date regex")
});

#[derive(Debug, Clone, Copy)]
enum Layout {
    Date(&'static str),
    Zoned(&'static str),
    Rfc3339,
}

/// Absolute layouts, tried in order. The first that parses wins.
const LAYOUTS: &[Layout] = &[
    Layout::Date("%Y-%m-%d"),
    Layout::Date("%d %b %Y"),
    Layout::Date("%B %d, %Y"),
    Layout::Date("%b %d, %Y"),
    Layout::Date("%m/%d/%Y"),
    Layout::Date("%d/%m/%Y"),
    Layout::Date("%Y.%m.%d"),
    Layout::Date("%d %B %Y"),
    Layout::Date("%d-%m-%Y"),
    Layout::Date("%B %d %Y"),
    Layout::Date("%b %d %Y"),
    Layout::Zoned("%Y-%m-%dT%H:%M:%S%z"),
    Layout::Rfc3339,
];

/// Normalizes raw date text relative to a reference "now".
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    fallback: Option<TimeDelta>,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self {
            fallback: Some(TimeDelta::days(1)),
        }
    }
}

impl DateNormalizer {
    /// `fallback` is the age assumed for unreadable text; `None` leaves such
    /// candidates undated.
    pub fn new(fallback: Option<TimeDelta>) -> Self {
        Self { fallback }
    }

    /// Build from a fallback expressed in whole days.
    pub fn with_fallback_days(days: Option<i64>) -> Self {
        Self::new(days.and_then(TimeDelta::try_days))
    }

    /// Convert `raw` to a timestamp.
    ///
    /// Order: relative phrases, then absolute layouts, then the fallback.
    pub fn normalize(&self, raw: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let text = collapse_whitespace(raw);

        if let Some(ts) = parse_relative(&text, now) {
            return Some(ts);
        }
        if let Some(ts) = parse_absolute(&text) {
            return Some(ts);
        }
        self.fallback.and_then(|age| now.checked_sub_signed(age))
    }
}

/// Relative phrases: "<n> <unit> ago", plus "just now", "today" and
/// "yesterday".
///
/// Any text containing "ago" yields a value; an unreadable unit or amount
/// means `now`.
pub fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = text.to_lowercase();

    if lower.contains("ago") {
        let delta = RELATIVE_AMOUNT.captures(&lower).and_then(|caps| {
            let amount: i64 = match (caps.get(1), caps.get(2)) {
                (Some(n), _) => n.as_str().parse().ok()?,
                (None, Some(_)) => 1,
                _ => return None,
            };
            unit_delta(caps.get(3)?.as_str(), amount)
        });
        return Some(
            delta
                .and_then(|d| now.checked_sub_signed(d))
                .unwrap_or(now),
        );
    }

    match lower.as_str() {
        "just now" | "today" => Some(now),
        "yesterday" => now.checked_sub_signed(TimeDelta::days(1)),
        _ => None,
    }
}

fn unit_delta(unit: &str, amount: i64) -> Option<TimeDelta> {
    match unit {
        "minute" | "minutes" | "min" | "mins" => TimeDelta::try_minutes(amount),
        "hour" | "hours" | "hr" | "hrs" | "h" => TimeDelta::try_hours(amount),
        "day" | "days" | "d" => TimeDelta::try_days(amount),
        "week" | "weeks" | "wk" | "wks" | "w" => TimeDelta::try_weeks(amount),
        "month" | "months" | "mo" => amount.checked_mul(30).and_then(TimeDelta::try_days),
        _ => None,
    }
}

/// Absolute dates. Date-only layouts resolve to midnight UTC.
pub fn parse_absolute(text: &str) -> Option<DateTime<Utc>> {
    LAYOUTS.iter().find_map(|layout| match layout {
        Layout::Date(fmt) => NaiveDate::parse_from_str(text, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc()),
        Layout::Zoned(fmt) => DateTime::parse_from_str(text, fmt)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Layout::Rfc3339 => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    })
}
