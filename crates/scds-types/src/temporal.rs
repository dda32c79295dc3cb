//! Commit timestamps and time-string parsing.
//!
//! Times are carried as seconds since the UNIX epoch (UTC). User-supplied
//! time strings are resolved in three steps, first success wins:
//!
//! 1. A relative duration added to "now": `5m`, `-48h5m`, `1.5h`.
//! 2. An absolute date/time from a fixed cascade of layouts.
//! 3. A raw integer taken as a UNIX timestamp.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::TypeError;

/// Current time in seconds since the UNIX epoch.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// How a layout string is interpreted.
#[derive(Clone, Copy, Debug)]
enum Layout {
    /// Date only, midnight UTC.
    Date(&'static str),
    /// Date and time without offset, taken as UTC.
    Naive(&'static str),
    /// Date and time with a numeric offset.
    Zoned(&'static str),
    /// RFC 1123 / RFC 822 family, with or without numeric zone.
    Rfc2822,
    Rfc3339,
}

/// Absolute layouts, tried in order.
const LAYOUTS: &[Layout] = &[
    Layout::Date("%d-%m-%Y"),
    Layout::Naive("%d-%m-%Y %I:%M %p"),
    Layout::Zoned("%d-%m-%Y %I:%M %p %z"),
    Layout::Zoned("%d-%m-%Y %I:%M %p %:z"),
    Layout::Date("%e %B %Y"),
    Layout::Naive("%e %B %Y %I:%M %p"),
    Layout::Zoned("%e %B %Y %I:%M %p %z"),
    Layout::Zoned("%e %B %Y %I:%M %p %:z"),
    Layout::Date("%Y-%m-%d"),
    Layout::Naive("%Y-%m-%d %I:%M %p"),
    Layout::Zoned("%Y-%m-%d %I:%M %p %z"),
    Layout::Zoned("%Y-%m-%d %I:%M %p %:z"),
    Layout::Rfc2822,
    Layout::Date("%B %e, %Y"),
    Layout::Naive("%B %e, %Y %I:%M %p"),
    Layout::Zoned("%B %e, %Y %I:%M %p %z"),
    Layout::Zoned("%B %e, %Y %I:%M %p %:z"),
    Layout::Date("%b %e, %Y"),
    Layout::Naive("%b %e, %Y, %I:%M %p"),
    Layout::Zoned("%b %e, %Y %I:%M %p %z"),
    Layout::Zoned("%b %e, %Y %I:%M %p %:z"),
    Layout::Rfc3339,
    // ANSI C asctime()
    Layout::Naive("%a %b %e %H:%M:%S %Y"),
];

impl Layout {
    fn parse(self, s: &str) -> Option<i64> {
        match self {
            Self::Date(fmt) => NaiveDate::parse_from_str(s, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| Utc.from_utc_datetime(&dt).timestamp()),
            Self::Naive(fmt) => NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| Utc.from_utc_datetime(&dt).timestamp()),
            Self::Zoned(fmt) => DateTime::parse_from_str(s, fmt)
                .ok()
                .map(|dt| dt.timestamp()),
            Self::Rfc2822 => DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.timestamp()),
            Self::Rfc3339 => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.timestamp()),
        }
    }
}

/// Parse a time string relative to the current instant.
pub fn parse_time_string(s: &str) -> Result<i64, TypeError> {
    parse_time_string_at(s, Utc::now())
}

/// Parse a time string, resolving relative durations against `now`.
pub fn parse_time_string_at(s: &str, now: DateTime<Utc>) -> Result<i64, TypeError> {
    let s = s.trim();

    if let Some(offset) = parse_duration(s) {
        return now
            .checked_add_signed(offset)
            .map(|t| t.timestamp())
            .ok_or_else(|| TypeError::InvalidTime(s.to_string()));
    }

    if let Some(ts) = LAYOUTS.iter().find_map(|layout| layout.parse(s)) {
        return Ok(ts);
    }

    s.parse::<i64>()
        .map_err(|_| TypeError::InvalidTime(s.to_string()))
}

/// Nanoseconds per duration unit.
fn unit_nanos(unit: &str) -> Option<i128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

/// Parse a signed sequence of decimal numbers with unit suffixes, such as
/// `300ms`, `-1.5h`, or `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0`
/// is accepted; any other number without a unit is not a duration.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    if rest == "0" {
        return Some(Duration::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_part, after) = rest.split_at(int_len);

        let (frac_part, after) = match after.strip_prefix('.') {
            Some(tail) => tail.split_at(tail.bytes().take_while(u8::is_ascii_digit).count()),
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }

        let unit_len = after
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, tail) = after.split_at(unit_len);
        let scale = unit_nanos(unit)?;

        if !int_part.is_empty() {
            let whole: i128 = int_part.parse().ok()?;
            total = total.checked_add(whole.checked_mul(scale)?)?;
        }
        if !frac_part.is_empty() {
            let frac: f64 = format!("0.{frac_part}").parse().ok()?;
            total = total.checked_add((frac * scale as f64) as i128)?;
        }
        if total > i64::MAX as i128 {
            return None;
        }

        rest = tail;
    }

    let nanos = if negative { -total } else { total };
    Some(Duration::nanoseconds(nanos as i64))
}
