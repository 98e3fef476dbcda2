//! Timestamp utilities
//!
//! Interruption feeds store instants as naive local TEXT timestamps. Queries
//! normalise them with SQLite `strftime('%Y-%m-%d %H:%M:%f', ...)`, which
//! always yields [`DB_TIMESTAMP_FORMAT`] at millisecond precision, so rows are
//! parsed exactly once here and bound instants compare as plain strings.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Timelike};

use crate::{Error, Result};

/// Canonical timestamp layout produced by SQLite `strftime('%Y-%m-%d %H:%M:%f')`
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const NANOS_PER_MILLI: u32 = 1_000_000;

/// Canonical date layout produced by SQLite `date()`
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

const ACCEPTED_TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a user or feed supplied timestamp
///
/// Accepts `T` or space separators, optional seconds and fractional seconds,
/// and a bare date (interpreted as midnight).
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();

    for format in ACCEPTED_TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }

    NaiveDate::parse_from_str(trimmed, DB_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| Error::InvalidInput(format!("Unrecognised timestamp: {}", input)))
}

/// Parse a timestamp read back from the database (already normalised)
pub fn parse_db_timestamp(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DB_TIMESTAMP_FORMAT)
        .map_err(|e| Error::InvalidData(format!("Bad stored timestamp '{}': {}", raw, e)))
}

/// Format an instant for binding against a normalised column
///
/// Sub-millisecond digits are truncated, so the result is the greatest stored
/// instant not after `ts`. Use it where the column must be `<=` the instant.
pub fn to_db_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

/// Like [`to_db_timestamp`], rounded up to the next whole millisecond
///
/// The result is the least stored instant not before `ts`. Use it where the
/// column must be `>=` the instant.
pub fn to_db_timestamp_ceil(ts: &NaiveDateTime) -> String {
    let sub_milli = ts.nanosecond() % NANOS_PER_MILLI;
    let ceil = if sub_milli == 0 {
        *ts
    } else {
        ts.checked_add_signed(TimeDelta::nanoseconds(i64::from(NANOS_PER_MILLI - sub_milli)))
            .unwrap_or(*ts)
    };
    to_db_timestamp(&ceil)
}

/// Format a calendar date for binding against `date(column)`
pub fn to_db_date(date: &NaiveDate) -> String {
    date.format(DB_DATE_FORMAT).to_string()
}

/// Shift `start` by a fractional number of hours
///
/// Returns `None` when the offset is not representable (non-finite or out of range).
pub fn add_hours(start: NaiveDateTime, hours: f64) -> Option<NaiveDateTime> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }

    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    start.checked_add_signed(delta)
}
