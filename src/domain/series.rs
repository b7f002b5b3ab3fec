// Uniform series - evenly-spaced single-field telemetry and multi-series alignment
use super::telemetry::TimeSeriesPoint;
use super::time::{offset_by_seconds, seconds_between};
use crate::error::DataError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Tolerance, in grid steps, for deciding whether an instant lands on a grid point.
const GRID_EPSILON: f64 = 1e-9;

/// Descriptive metadata carried alongside the values of a [`UniformSeries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMeta {
    /// Start of the coverage window of the query that produced the data.
    pub start: DateTime<Utc>,
    /// End of the coverage window. After resampling this need not equal
    /// `start + (len - 1) * granularity`.
    pub stop: DateTime<Utc>,
    /// Seconds between consecutive samples.
    pub granularity: f64,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub units: String,
}

impl SeriesMeta {
    pub fn new(start: DateTime<Utc>, stop: DateTime<Utc>, granularity: f64) -> Self {
        Self {
            start,
            stop,
            granularity,
            field: String::new(),
            measurement: String::new(),
            units: String::new(),
        }
    }
}

/// How the shared time axis of an alignment picks its spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GranularityPolicy {
    /// Use the largest input granularity, never inventing detail finer than
    /// the least precise input.
    #[default]
    Coarsest,
    /// Use the smallest input granularity, upsampling coarser inputs.
    Finest,
}

/// Gap-fill policy for alignment.
///
/// Both methods are reserved: alignment only ever interpolates inside the
/// intersection of the input windows, so they currently behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMethod {
    #[default]
    Pad,
    Backfill,
}

impl FromStr for AlignMethod {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pad" => Ok(AlignMethod::Pad),
            "backfill" => Ok(AlignMethod::Backfill),
            other => Err(DataError::UnknownAlignMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignOptions {
    #[serde(default)]
    pub method: AlignMethod,
    #[serde(default)]
    pub granularity: GranularityPolicy,
}

/// A homogeneous, evenly-spaced series of samples.
///
/// Sample `i` sits at `start + i * granularity`. The series is immutable:
/// every transformation returns a new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRecord", into = "SeriesRecord")]
pub struct UniformSeries {
    values: Vec<f64>,
    meta: SeriesMeta,
}

impl UniformSeries {
    pub fn new(values: Vec<f64>, meta: SeriesMeta) -> Result<Self, DataError> {
        if values.is_empty() {
            return Err(DataError::EmptyInput);
        }
        check_granularity(meta.granularity)?;
        Ok(Self { values, meta })
    }

    /// Resample irregular rows onto an evenly-spaced grid.
    ///
    /// Rows must be sorted by time; unsorted rows produce meaningless output.
    /// The grid is the half-open range `[0, span)` measured from the first
    /// row, so a `9s` span at `1s` yields nine samples and the last row's own
    /// time is never a grid point. A single row yields a one-sample series.
    pub fn from_rows(
        rows: &[TimeSeriesPoint],
        granularity: f64,
        field: &str,
        units: &str,
    ) -> Result<Self, DataError> {
        let (first, last) = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DataError::EmptyInput),
        };
        let granularity = check_granularity(granularity)?;

        let times: Vec<f64> = rows
            .iter()
            .map(|row| seconds_between(&first.time, &row.time))
            .collect();
        let raw_values: Vec<f64> = rows.iter().map(|row| row.value).collect();

        let span = seconds_between(&first.time, &last.time);
        let count = ((span / granularity).ceil() as usize).max(1);
        let axis = regular_axis(count, granularity, 0.0);

        Ok(Self {
            values: interpolate(&axis, &times, &raw_values),
            meta: SeriesMeta {
                start: first.time,
                stop: last.time,
                granularity,
                field: field.to_string(),
                measurement: String::new(),
                units: units.to_string(),
            },
        })
    }

    pub fn with_measurement(mut self, measurement: impl Into<String>) -> Self {
        self.meta.measurement = measurement.into();
        self
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn meta(&self) -> &SeriesMeta {
        &self.meta
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.meta.start
    }

    pub fn stop(&self) -> DateTime<Utc> {
        self.meta.stop
    }

    pub fn granularity(&self) -> f64 {
        self.meta.granularity
    }

    pub fn field(&self) -> &str {
        &self.meta.field
    }

    pub fn measurement(&self) -> &str {
        &self.meta.measurement
    }

    pub fn units(&self) -> &str {
        &self.meta.units
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Absolute time of every sample.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.sample_offsets()
            .into_iter()
            .map(|offset| offset_by_seconds(&self.meta.start, offset))
            .collect()
    }

    /// Re-interpolate the series onto a new spacing over its own sample span.
    pub fn resample(&self, granularity: f64) -> Result<Self, DataError> {
        let granularity = check_granularity(granularity)?;
        let span = (self.len() - 1) as f64 * self.meta.granularity;
        let axis = regular_axis(grid_count(span, granularity), granularity, 0.0);

        Ok(Self {
            values: interpolate(&axis, &self.sample_offsets(), &self.values),
            meta: SeriesMeta {
                granularity,
                ..self.meta.clone()
            },
        })
    }

    /// Keep only the samples that fall inside `[start, stop]`.
    pub fn crop(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<Self, DataError> {
        let step = self.meta.granularity;
        let from = seconds_between(&self.meta.start, &start) / step;
        let to = seconds_between(&self.meta.start, &stop) / step;

        let first = ((from - GRID_EPSILON).ceil() as i64).max(0);
        let last = ((to + GRID_EPSILON).floor() as i64).min(self.len() as i64 - 1);
        if first > last {
            return Err(DataError::NoOverlap {
                start: start.max(self.meta.start),
                stop: stop.min(self.meta.stop),
            });
        }

        let (first, last) = (first as usize, last as usize);
        Ok(Self {
            values: self.values[first..=last].to_vec(),
            meta: SeriesMeta {
                start: offset_by_seconds(&self.meta.start, first as f64 * step),
                stop: stop.min(self.meta.stop),
                ..self.meta.clone()
            },
        })
    }

    /// Align series onto a shared time axis with the default options.
    pub fn align(series: &[&UniformSeries]) -> Result<Vec<UniformSeries>, DataError> {
        Self::align_with(series, AlignOptions::default())
    }

    pub fn align_pair(
        a: &UniformSeries,
        b: &UniformSeries,
    ) -> Result<(UniformSeries, UniformSeries), DataError> {
        let [a, b]: [UniformSeries; 2] = Self::align(&[a, b])?
            .try_into()
            .map_err(|_| DataError::NothingToAlign)?;
        Ok((a, b))
    }

    /// Resample every series onto one evenly-spaced absolute time axis.
    ///
    /// The axis covers the intersection of the inputs' coverage windows,
    /// starting at the latest start and stepping by the granularity chosen by
    /// `options.granularity` for as long as it stays at or before the earliest
    /// end. A series ends at its stop or at its last sample, whichever comes
    /// first, so no axis point lies past the data it is interpolated from.
    /// Each output keeps its input's field, measurement and units.
    pub fn align_with(
        series: &[&UniformSeries],
        options: AlignOptions,
    ) -> Result<Vec<UniformSeries>, DataError> {
        let first = series.first().ok_or(DataError::NothingToAlign)?;

        let granularity = series
            .iter()
            .map(|s| s.meta.granularity)
            .fold(first.meta.granularity, |chosen, g| match options.granularity {
                GranularityPolicy::Coarsest => chosen.max(g),
                GranularityPolicy::Finest => chosen.min(g),
            });
        let start = series
            .iter()
            .map(|s| s.meta.start)
            .fold(first.meta.start, |latest, t| latest.max(t));
        let stop = series
            .iter()
            .map(|s| s.last_sample_time())
            .fold(first.last_sample_time(), |earliest, t| earliest.min(t));

        if start >= stop {
            return Err(DataError::NoOverlap { start, stop });
        }

        let span = seconds_between(&start, &stop);
        let count = grid_count(span, granularity);
        tracing::debug!(
            series = series.len(),
            granularity,
            samples = count,
            method = ?options.method,
            "aligning series over {} .. {}",
            start,
            stop
        );

        Ok(series
            .iter()
            .map(|s| {
                let offset = seconds_between(&s.meta.start, &start);
                let axis = regular_axis(count, granularity, offset);
                UniformSeries {
                    values: interpolate(&axis, &s.sample_offsets(), &s.values),
                    meta: SeriesMeta {
                        start,
                        stop,
                        granularity,
                        ..s.meta.clone()
                    },
                }
            })
            .collect())
    }

    fn last_sample_time(&self) -> DateTime<Utc> {
        let last = offset_by_seconds(
            &self.meta.start,
            (self.len() - 1) as f64 * self.meta.granularity,
        );
        last.min(self.meta.stop)
    }

    fn sample_offsets(&self) -> Vec<f64> {
        regular_axis(self.len(), self.meta.granularity, 0.0)
    }
}

impl AsRef<[f64]> for UniformSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

/// Serialized form of a [`UniformSeries`]; deserializing re-checks its invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SeriesRecord {
    values: Vec<f64>,
    #[serde(flatten)]
    meta: SeriesMeta,
}

impl TryFrom<SeriesRecord> for UniformSeries {
    type Error = DataError;

    fn try_from(record: SeriesRecord) -> Result<Self, Self::Error> {
        UniformSeries::new(record.values, record.meta)
    }
}

impl From<UniformSeries> for SeriesRecord {
    fn from(series: UniformSeries) -> Self {
        SeriesRecord {
            values: series.values,
            meta: series.meta,
        }
    }
}

fn check_granularity(granularity: f64) -> Result<f64, DataError> {
    if granularity.is_finite() && granularity > 0.0 {
        Ok(granularity)
    } else {
        Err(DataError::InvalidGranularity(granularity))
    }
}

/// Number of grid points in `[0, span]` at spacing `step`, counting both ends.
fn grid_count(span: f64, step: f64) -> usize {
    (span / step + GRID_EPSILON).floor() as usize + 1
}

fn regular_axis(count: usize, step: f64, offset: f64) -> Vec<f64> {
    (0..count).map(|i| offset + i as f64 * step).collect()
}

/// Piecewise-linear interpolation of `(xs, ys)` at each target.
///
/// `xs` must be non-empty and non-decreasing. Targets outside `xs` take the
/// nearest boundary value.
fn interpolate(targets: &[f64], xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let last = xs.len() - 1;
    targets
        .iter()
        .map(|&x| {
            if x <= xs[0] {
                return ys[0];
            }
            if x >= xs[last] {
                return ys[last];
            }
            let upper = xs.partition_point(|&v| v <= x).clamp(1, last);
            let lower = upper - 1;
            let fraction = (x - xs[lower]) / (xs[upper] - xs[lower]);
            ys[lower] + fraction * (ys[upper] - ys[lower])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).unwrap()
    }

    fn series(start: i64, granularity: f64, values: &[f64]) -> UniformSeries {
        let start = at(start);
        let stop = offset_by_seconds(&start, (values.len() - 1) as f64 * granularity);
        UniformSeries::new(values.to_vec(), SeriesMeta::new(start, stop, granularity)).unwrap()
    }

    fn assert_values(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} != {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    const SERIES_1: [f64; 10] = [1.0, 2.0, 3.0, 3.0, 3.0, 2.0, 4.0, 4.0, 4.0, 1.0];

    const SERIES_2: [f64; 14] = [
        1.0, 2.0, 1.0, 2.0, 7.0, 8.0, 3.0, 2.0, 4.0, 4.0, 4.0, 1.0, 4.0, 3.0,
    ];

    const SERIES_2_HALF_SECOND: [f64; 27] = [
        1.0, 2.0, 1.0, 2.0, 7.0, 8.0, 3.0, 2.0, 4.0, 4.0, 4.0, 1.0, 4.0, 3.0, 1.0, 2.0, 1.0, 2.0,
        7.0, 8.0, 3.0, 2.0, 4.0, 4.0, 4.0, 1.0, 1.0,
    ];

    #[test]
    fn test_from_rows_interpolates_onto_grid() {
        let rows: Vec<TimeSeriesPoint> = [(0, 0.0), (1500, 3.0), (3000, 6.0), (4000, 2.0)]
            .into_iter()
            .map(|(ms, v)| TimeSeriesPoint::new(at(100) + chrono::TimeDelta::milliseconds(ms), v))
            .collect();

        let series = UniformSeries::from_rows(&rows, 1.0, "PackCurrent", "A").unwrap();

        // arange(0, 4, 1) excludes the final row's time
        assert_values(series.values(), &[0.0, 2.0, 4.0, 6.0]);
        assert_eq!(series.start(), at(100));
        assert_eq!(series.stop(), at(104));
        assert_eq!(series.granularity(), 1.0);
        assert_eq!(series.field(), "PackCurrent");
        assert_eq!(series.units(), "A");
    }

    #[test]
    fn test_from_rows_length_is_deterministic() {
        let rows: Vec<TimeSeriesPoint> = (0..=10)
            .map(|s| TimeSeriesPoint::new(at(s), s as f64))
            .collect();

        assert_eq!(UniformSeries::from_rows(&rows, 1.0, "", "").unwrap().len(), 10);
        assert_eq!(UniformSeries::from_rows(&rows, 0.1, "", "").unwrap().len(), 100);
        assert_eq!(UniformSeries::from_rows(&rows, 3.0, "", "").unwrap().len(), 4);

        let single = [TimeSeriesPoint::new(at(5), 42.0)];
        assert_values(UniformSeries::from_rows(&single, 1.0, "", "").unwrap().values(), &[42.0]);
    }

    #[test]
    fn test_from_rows_rejects_bad_input() {
        assert_eq!(
            UniformSeries::from_rows(&[], 1.0, "", ""),
            Err(DataError::EmptyInput)
        );

        let rows = [TimeSeriesPoint::new(at(0), 1.0), TimeSeriesPoint::new(at(1), 2.0)];
        for granularity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                UniformSeries::from_rows(&rows, granularity, "", ""),
                Err(DataError::InvalidGranularity(_))
            ));
        }
    }

    #[test]
    fn test_align_identity() {
        let a = series(4, 1.0, &SERIES_1);
        let b = series(4, 1.0, &[5.0, 4.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 4.0]);

        let (a_aligned, b_aligned) = UniformSeries::align_pair(&a, &b).unwrap();

        assert_eq!(a_aligned.values(), a.values());
        assert_eq!(b_aligned.values(), b.values());
        assert_eq!(a_aligned.meta(), a.meta());
    }

    #[test]
    fn test_align_identity_from_rows() {
        let rows: Vec<TimeSeriesPoint> = (0..=10)
            .map(|s| TimeSeriesPoint::new(at(s), s as f64))
            .collect();
        let a = UniformSeries::from_rows(&rows, 1.0, "PackVoltage", "V").unwrap();
        let b = UniformSeries::from_rows(&rows, 1.0, "PackCurrent", "A").unwrap();

        let (a_aligned, b_aligned) = UniformSeries::align_pair(&a, &b).unwrap();

        // Last sample sits at 9s even though the rows run to 10s
        assert_values(a_aligned.values(), a.values());
        assert_values(b_aligned.values(), b.values());
        assert_eq!(a_aligned.stop(), at(9));
    }

    #[test]
    fn test_align_from_rows_stays_inside_samples() {
        let voltage: Vec<TimeSeriesPoint> = (0..=10)
            .map(|s| TimeSeriesPoint::new(at(s), s as f64))
            .collect();
        let current: Vec<TimeSeriesPoint> = (4..=20)
            .map(|h| TimeSeriesPoint::new(at(0) + chrono::TimeDelta::milliseconds(h * 500), 1.0))
            .collect();
        let a = UniformSeries::from_rows(&voltage, 1.0, "", "").unwrap();
        let b = UniformSeries::from_rows(&current, 0.5, "", "").unwrap();

        let (a_aligned, b_aligned) = UniformSeries::align_pair(&a, &b).unwrap();

        assert_values(a_aligned.values(), &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(b_aligned.len(), 8);
        assert_eq!(a_aligned.stop(), at(9));
    }

    #[test]
    fn test_align_with_same_granularity() {
        let a = series(4, 1.0, &SERIES_1);
        let b = series(2, 1.0, &SERIES_2);

        let (a_aligned, b_aligned) = UniformSeries::align_pair(&a, &b).unwrap();

        assert_values(a_aligned.values(), &SERIES_1);
        assert_values(
            b_aligned.values(),
            &[1.0, 2.0, 7.0, 8.0, 3.0, 2.0, 4.0, 4.0, 4.0, 1.0],
        );
        assert_eq!(a_aligned.start(), at(4));
        assert_eq!(b_aligned.stop(), at(13));
    }

    #[test]
    fn test_align_with_different_granularity_uses_coarsest() {
        let a = series(4, 1.0, &SERIES_1);
        let b = series(2, 0.5, &SERIES_2_HALF_SECOND);

        let (a_aligned, b_aligned) = UniformSeries::align_pair(&a, &b).unwrap();

        assert_eq!(a_aligned.granularity(), 1.0);
        assert_eq!(b_aligned.granularity(), 1.0);
        assert_values(a_aligned.values(), &SERIES_1);
        assert_values(
            b_aligned.values(),
            &[7.0, 3.0, 4.0, 4.0, 4.0, 1.0, 1.0, 7.0, 3.0, 4.0],
        );
    }

    #[test]
    fn test_align_with_different_granularity_finest() {
        let a = series(4, 1.0, &SERIES_1);
        let b = series(2, 0.5, &SERIES_2_HALF_SECOND);
        let options = AlignOptions {
            granularity: GranularityPolicy::Finest,
            ..AlignOptions::default()
        };

        let aligned = UniformSeries::align_with(&[&a, &b], options).unwrap();

        assert_eq!(aligned[0].granularity(), 0.5);
        assert_values(
            aligned[0].values(),
            &[
                1.0, 1.5, 2.0, 2.5, 3.0, 3.0, 3.0, 3.0, 3.0, 2.5, 2.0, 3.0, 4.0, 4.0, 4.0, 4.0, 4.0,
                2.5, 1.0,
            ],
        );
        assert_values(
            aligned[1].values(),
            &[
                7.0, 8.0, 3.0, 2.0, 4.0, 4.0, 4.0, 1.0, 4.0, 3.0, 1.0, 2.0, 1.0, 2.0, 7.0, 8.0, 3.0,
                2.0, 4.0,
            ],
        );
    }

    #[test]
    fn test_align_window_intersection() {
        let a_values: Vec<f64> = (0..=10).map(f64::from).collect();
        let b_values: Vec<f64> = (0..=30).map(|i| 100.0 + f64::from(i)).collect();
        let a = series(1_000, 1.0, &a_values);
        let b = series(1_002, 0.5, &b_values);

        let (a_aligned, b_aligned) = UniformSeries::align_pair(&a, &b).unwrap();

        for aligned in [&a_aligned, &b_aligned] {
            assert_eq!(aligned.start(), at(1_002));
            assert_eq!(aligned.stop(), at(1_010));
            assert_eq!(aligned.granularity(), 1.0);
            assert_eq!(aligned.len(), 9);
        }
        assert_values(
            a_aligned.values(),
            &[2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        );
        assert_values(
            b_aligned.values(),
            &[100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0, 114.0, 116.0],
        );
    }

    #[test]
    fn test_align_truncates_to_grid_before_stop() {
        let a = series(0, 1.0, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = series(0, 2.0, &[0.0, 20.0, 40.0]);
        let shifted = UniformSeries::new(
            b.values().to_vec(),
            SeriesMeta::new(at(0), at(5), 2.0),
        )
        .unwrap();

        let (a_aligned, _) = UniformSeries::align_pair(&a, &shifted).unwrap();

        // Grid 0, 2, 4 stays at or before the 5s stop
        assert_values(a_aligned.values(), &[0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_align_disjoint_windows_fail() {
        let a = series(0, 1.0, &[1.0, 2.0, 3.0]);
        let b = series(10, 1.0, &[1.0, 2.0, 3.0]);

        assert_eq!(
            UniformSeries::align_pair(&a, &b),
            Err(DataError::NoOverlap {
                start: at(10),
                stop: at(2)
            })
        );
    }

    #[test]
    fn test_align_requires_input() {
        assert_eq!(UniformSeries::align(&[]), Err(DataError::NothingToAlign));
    }

    #[test]
    fn test_align_preserves_labels() {
        let a = UniformSeries::new(SERIES_1.to_vec(), SeriesMeta {
            field: "PackVoltage".to_string(),
            units: "V".to_string(),
            ..SeriesMeta::new(at(4), at(13), 1.0)
        })
        .unwrap()
        .with_measurement("BMS");
        let b = series(2, 1.0, &SERIES_2);

        let aligned = UniformSeries::align(&[&a, &b, &a]).unwrap();

        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0].field(), "PackVoltage");
        assert_eq!(aligned[0].measurement(), "BMS");
        assert_eq!(aligned[0].units(), "V");
        assert_eq!(aligned[1].field(), "");
    }

    #[test]
    fn test_align_method_parsing() {
        assert_eq!("pad".parse::<AlignMethod>(), Ok(AlignMethod::Pad));
        assert_eq!("backfill".parse::<AlignMethod>(), Ok(AlignMethod::Backfill));
        assert_eq!(
            "nearest".parse::<AlignMethod>(),
            Err(DataError::UnknownAlignMethod("nearest".to_string()))
        );
    }

    #[test]
    fn test_resample() {
        let s = series(0, 1.0, &[0.0, 10.0, 20.0]);

        let fine = s.resample(0.5).unwrap();
        assert_values(fine.values(), &[0.0, 5.0, 10.0, 15.0, 20.0]);
        assert_eq!(fine.granularity(), 0.5);

        let coarse = s.resample(2.0).unwrap();
        assert_values(coarse.values(), &[0.0, 20.0]);
    }

    #[test]
    fn test_crop() {
        let s = series(0, 1.0, &SERIES_1);

        let cropped = s.crop(at(2), at(5)).unwrap();
        assert_values(cropped.values(), &[3.0, 3.0, 3.0, 2.0]);
        assert_eq!(cropped.start(), at(2));
        assert_eq!(cropped.stop(), at(5));

        assert!(matches!(
            s.crop(at(20), at(30)),
            Err(DataError::NoOverlap { .. })
        ));
    }

    #[test]
    fn test_timestamps_and_mean() {
        let s = series(10, 0.5, &[1.0, 2.0, 3.0]);
        assert_eq!(
            s.timestamps(),
            vec![
                at(10),
                at(10) + chrono::TimeDelta::milliseconds(500),
                at(11)
            ]
        );
        assert_abs_diff_eq!(s.mean(), 2.0);
    }

    #[test]
    fn test_serde_revalidates() {
        let s = series(4, 1.0, &SERIES_1);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<UniformSeries>(&json).unwrap(), s);

        let broken = json.replace("\"granularity\":1.0", "\"granularity\":-1.0");
        assert!(serde_json::from_str::<UniformSeries>(&broken).is_err());
    }
}
