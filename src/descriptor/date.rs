//! `Date` value parsing.
//!
//! Strict mode accepts RFC3339 only. Free mode falls back to RFC2822 and a
//! list of ISO8601-ish layouts; layouts without an offset are taken as UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Layouts carrying an explicit UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y%m%dT%H%M%S%z",
];

/// Date-time layouts without an offset.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
];

/// Date-only layouts.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y"];

/// Parse a descriptor `Date` value.
pub fn parse_date(value: &str, free_date: bool) -> Result<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date);
    }

    if free_date && let Some(date) = parse_free(value) {
        return Ok(date);
    }

    Err(Error::descriptor(format!(
        "Date value \"{value}\" not valid RFC3339{}",
        if free_date {
            ", nor any ISO8601 format, nor RFC2822, nor any other supported format"
        } else {
            ""
        }
    )))
}

fn parse_free(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date);
    }

    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(value, format) {
            return Some(date);
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(value, format) {
            return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc().fixed_offset());
        }
    }

    None
}
