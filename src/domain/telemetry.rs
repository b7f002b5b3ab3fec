// Raw telemetry rows as returned by a query
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

impl From<(DateTime<Utc>, f64)> for TimeSeriesPoint {
    fn from((time, value): (DateTime<Utc>, f64)) -> Self {
        Self { time, value }
    }
}
