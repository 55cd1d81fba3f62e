//! Tolerant parsing of record and request dates.
//!
//! Dataset exports mix short dotted dates (`27.7.25`), ISO dates and
//! timestamps, and slash- or dash-separated day-first dates.

use chrono::{NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a date in any of the known formats.
///
/// Returns `None` for blank or unrecognized input.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // `%y` would also accept a four-digit year as its first two digits, so
    // only try it on inputs that end with a two-digit year.
    let two_digit_year = s.rsplit('.').next().is_some_and(|y| y.len() == 2);

    DATE_FORMATS
        .iter()
        .filter(|fmt| two_digit_year || !fmt.ends_with("%y"))
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Formats a date the way reports print it.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
