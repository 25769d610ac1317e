//! Normalization of free-text registry dates.
//!
//! WHOIS has no date grammar, so every registry picks its own. Inputs are
//! matched against a fixed, ordered list of layouts; the first layout that
//! parses wins, which keeps the result stable for ambiguous inputs such as
//! `03/04/2025`. Anything that still fails goes through a permissive guesser,
//! and inputs nobody understands normalize to `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// How a layout string is applied to the input.
#[derive(Debug, Clone, Copy)]
enum Layout {
    /// A complete date (optionally with time of day).
    Full(&'static str),
    /// Month and year only; the day is pinned to the first of the month.
    MonthOnly(&'static str),
    /// A complete date whose day carries an English ordinal suffix (`29th`).
    Ordinal(&'static str),
}

/// Year-first layouts come before the ambiguous day/month-first ones.
const LAYOUTS: &[Layout] = &[
    Layout::Full("%Y. %m. %d"),
    Layout::Full("%Y. %m. %d."),
    Layout::Full("%Y.%m.%d."),
    Layout::Full("%Y.%m.%d"),
    Layout::Full("%Y-%m-%d"),
    Layout::Full("%d-%b-%Y"),
    Layout::Full("%Y/%m/%d"),
    Layout::Full("%B %d, %Y"),
    Layout::Full("%d.%m.%Y"),
    Layout::Full("%Y-%m-%dT%H:%M:%SZ"),
    Layout::Full("%a, %d %b %Y"),
    Layout::Full("%Y-%B-%d"),
    Layout::MonthOnly("before %b-%Y"),
    Layout::Full("%d/%m/%Y"),
    Layout::Full("%m/%d/%Y"),
    Layout::Full("%Y%m%d"),
    Layout::Full("%d%m%Y"),
    Layout::Ordinal("%B %d, %Y"),
    Layout::Full("%A, %B %d, %Y"),
];

/// Retried after all whitespace has been removed (`2024. 1. 5` style input).
const COMPACT_LAYOUT: &str = "%Y.%m.%d";

const GUESS_LAYOUTS_WITH_OFFSET: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%d-%b-%Y %H:%M:%S %z",
];

const GUESS_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%a %b %d %H:%M:%S %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%d-%B-%Y",
    "%d-%m-%Y",
];

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex"));

static LEADING_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})\b").expect("valid regex"));

/// Normalizes a registry date string to a UTC instant.
///
/// Returns `None` when no known representation matches. Never fails.
pub fn normalize_date(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(dt) = LAYOUTS.iter().find_map(|layout| apply_layout(trimmed, *layout)) {
        return Some(dt);
    }

    let compact: String = trimmed.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(dt) = parse_naive(&compact, COMPACT_LAYOUT) {
        return Some(dt);
    }

    let guessed = guess(trimmed);
    if guessed.is_none() {
        debug!(input = %trimmed, "Unrecognized date format");
    }
    guessed
}

fn apply_layout(input: &str, layout: Layout) -> Option<DateTime<Utc>> {
    match layout {
        Layout::Full(fmt) => parse_naive(input, fmt),
        Layout::MonthOnly(fmt) => parse_naive(&format!("1 {}", input), &format!("%d {}", fmt)),
        Layout::Ordinal(fmt) => {
            if !ORDINAL_SUFFIX.is_match(input) {
                return None;
            }
            let stripped = ORDINAL_SUFFIX.replace_all(input, "$1");
            parse_naive(&stripped, fmt)
        }
    }
}

/// Parses with a single layout, as a date-time first and then as a bare date
/// at midnight UTC.
fn parse_naive(input: &str, fmt: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(input, fmt)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Permissive last resort for the formats registries emit with times,
/// offsets or zone suffixes attached.
fn guess(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let cleaned = input
        .replace(" (UTC)", "")
        .replace(" UTC", "")
        .replace(" GMT", "")
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();

    for fmt in GUESS_LAYOUTS_WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(&cleaned, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    if let Some(dt) = GUESS_LAYOUTS.iter().find_map(|fmt| parse_naive(&cleaned, fmt)) {
        return Some(dt);
    }

    // Unix timestamps in seconds.
    if cleaned.len() == 10 && cleaned.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(secs) = cleaned.parse::<i64>() {
            return Utc.timestamp_opt(secs, 0).single();
        }
    }

    // Date followed by trailing noise, e.g. `2024-03-01 (registry time)`.
    let caps = LEADING_ISO_DATE.captures(&cleaned)?;
    parse_naive(caps.get(1)?.as_str(), "%Y-%m-%d")
}
