//! Display formatting for delivery dates.

use chrono::{NaiveDateTime, ParseResult};

const DATE_FORMAT: &str = "%A, %B %-d, %Y";
const DATE_TIME_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M %p";

/// Accepted spellings of a local instant, most specific first.
const INSTANT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Long English form used throughout the storefront, e.g.
/// `Saturday, October 11, 2025` or `Saturday, October 11, 2025 at 9:05 AM`.
#[must_use]
pub fn format_delivery_date(at: NaiveDateTime, include_time: bool) -> String {
    at.format(if include_time {
        DATE_TIME_FORMAT
    } else {
        DATE_FORMAT
    })
    .to_string()
}

/// Parse a local wall-clock instant such as `2025-10-11T09:00` or
/// `2025-10-11 09:00:00`.
///
/// # Errors
///
/// The error from the last format tried if none of them match.
pub fn parse_local_instant(input: &str) -> ParseResult<NaiveDateTime> {
    let input = input.trim();
    let mut last = NaiveDateTime::parse_from_str(input, INSTANT_FORMATS[0]);

    for format in &INSTANT_FORMATS[1..] {
        if last.is_ok() {
            break;
        }
        last = NaiveDateTime::parse_from_str(input, format);
    }

    last
}
