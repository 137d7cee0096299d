//! Date values stored in spreadsheet cells.
//!
//! Cells stay strings in the table; dates are parsed at the call site and
//! never written back. Accepted inputs, tried in order:
//!
//! 1. RFC 3339 / RFC 2822 timestamps (converted to UTC)
//! 2. Year-first dates with an optional time (`2026-01-15`, `2026/01/15 08:30`)
//! 3. Day-first dates `D/M/Y[ H:M[:S]]` with `/` or `-` separators and a 2- or
//!    4-digit year; 2-digit years are in the 2000s

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::{GridError, Result};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

static YEAR_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[-/]").expect("valid year-first pattern"));

static DAY_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?$")
        .expect("valid day-first pattern")
});

/// Parses a cell value as a date, or `None` if it isn't one.
///
/// Empty cells and impossible calendar dates (`31/02/2026`) are `None`.
///
/// # Example
///
/// ```rust
/// use tsvgrid::parsing::parse_cell_date;
///
/// let a = parse_cell_date("2026-01-15").unwrap();
/// let b = parse_cell_date("15/01/26").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_cell_date("pronto").is_none());
/// ```
pub fn parse_cell_date(value: &str) -> Option<NaiveDateTime> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_utc());
    }

    if YEAR_FIRST.is_match(s) {
        if let Some(dt) = parse_year_first(s) {
            return Some(dt);
        }
    }

    parse_day_first(s)
}

/// Parses the optional lower bound supplied for an export.
///
/// Blank input means "no lower bound". `YYYY-MM-DD` is the advertised form,
/// but every cell format listed in the module docs is accepted too, so a
/// bound can be copied straight from a cell.
///
/// # Errors
///
/// Returns [`GridError::InvalidDate`] for non-blank input that isn't a date.
pub fn parse_lower_bound(input: &str) -> Result<Option<NaiveDateTime>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_cell_date(trimmed)
        .map(Some)
        .ok_or_else(|| GridError::invalid_date(trimmed))
}

fn parse_year_first(s: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_time(chrono::NaiveTime::MIN));
        }
    }
    None
}

fn parse_day_first(s: &str) -> Option<NaiveDateTime> {
    let caps = DAY_FIRST.captures(s)?;
    let num = |i: usize| -> Option<u32> {
        caps.get(i).map_or(Some(0), |m| m.as_str().parse().ok())
    };

    let day = num(1)?;
    let month = num(2)?;
    let mut year = i32::try_from(num(3)?).ok()?;
    if year < 100 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(num(4)?, num(5)?, num(6)?)
}
