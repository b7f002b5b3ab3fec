// Domain error taxonomy
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised synchronously by the pure domain layer.
///
/// Every variant describes bad input supplied by the caller; nothing here is
/// transient, so nothing is ever retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("cannot build a series from zero rows")]
    EmptyInput,

    #[error("granularity must be a positive, finite number of seconds, got {0}")]
    InvalidGranularity(f64),

    #[error("no overlapping time range: latest start {start} is not before earliest stop {stop}")]
    NoOverlap {
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    },

    #[error("at least one series is required for alignment")]
    NothingToAlign,

    #[error("unrecognized alignment method `{0}` (expected `pad` or `backfill`)")]
    UnknownAlignMethod(String),

    #[error("mapping is missing required key(s): {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("mapping key `{key}` must be {expected}")]
    WrongMappingType { key: String, expected: &'static str },

    #[error("timestamp `{0}` carries no timezone information")]
    NaiveTimestamp(String),

    #[error("invalid ISO 8601 timestamp `{input}`: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("canonical path `{0}` must have exactly four `/`-separated components")]
    MalformedCanonicalPath(String),

    #[error("file type {declared} does not match the {actual} data it was given")]
    FileTypeMismatch {
        declared: &'static str,
        actual: &'static str,
    },

    #[error("lap {lap} does not exist, day {day} has {count} laps")]
    UnknownLap { day: u32, lap: usize, count: usize },
}
