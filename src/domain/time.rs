// Timezone normalization and ISO 8601 helpers shared by every timestamped type
use crate::error::DataError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, TimeZone, Timelike, Utc};

const NANOS_PER_SECOND: f64 = 1e9;

/// Something that can be resolved to an absolute UTC instant: either an
/// ISO 8601 string with an offset, or an already-resolved timestamp.
#[derive(Debug, Clone, PartialEq)]
pub enum DateLike {
    Iso(String),
    Instant(DateTime<Utc>),
}

impl DateLike {
    pub fn to_utc(&self) -> Result<DateTime<Utc>, DataError> {
        match self {
            DateLike::Iso(text) => parse_iso_datetime(text),
            DateLike::Instant(instant) => Ok(*instant),
        }
    }
}

impl From<&str> for DateLike {
    fn from(text: &str) -> Self {
        DateLike::Iso(text.to_string())
    }
}

impl From<String> for DateLike {
    fn from(text: String) -> Self {
        DateLike::Iso(text)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateLike {
    fn from(instant: DateTime<Tz>) -> Self {
        DateLike::Instant(ensure_utc(&instant))
    }
}

/// Re-express an aware timestamp in UTC.
///
/// Naive timestamps cannot reach this function; they are rejected when parsed.
pub fn ensure_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

/// Parse an ISO 8601 timestamp that carries a `Z` or `±hh:mm` offset and
/// normalize it to UTC.
pub fn parse_iso_datetime(text: &str) -> Result<DateTime<Utc>, DataError> {
    let trimmed = text.trim();
    match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => Ok(ensure_utc(&parsed)),
        Err(err) => {
            let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"));
            if naive.is_ok() {
                Err(DataError::NaiveTimestamp(text.to_string()))
            } else {
                Err(DataError::InvalidTimestamp {
                    input: text.to_string(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Format a UTC timestamp as `2024-11-07T15:30:45Z`, adding microseconds when
/// the timestamp has a fractional second and nanoseconds when microseconds
/// would lose precision.
pub fn iso_string_from_datetime(dt: &DateTime<Utc>) -> String {
    let format = match dt.nanosecond() {
        0 => SecondsFormat::Secs,
        nanos if nanos % 1_000 == 0 => SecondsFormat::Micros,
        _ => SecondsFormat::Nanos,
    };
    dt.to_rfc3339_opts(format, true)
}

/// Signed number of seconds from `from` to `to`.
pub fn seconds_between(from: &DateTime<Utc>, to: &DateTime<Utc>) -> f64 {
    let delta = *to - *from;
    match delta.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_SECOND,
        // Spans past ~292 years overflow nanoseconds
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}

/// Shift `dt` by a (possibly fractional) number of seconds, rounded to the nanosecond.
pub fn offset_by_seconds(dt: &DateTime<Utc>, seconds: f64) -> DateTime<Utc> {
    *dt + TimeDelta::nanoseconds((seconds * NANOS_PER_SECOND).round() as i64)
}
