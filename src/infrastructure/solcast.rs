// Solcast weather client - live estimates and forecasts around a time window
use crate::domain::series::UniformSeries;
use crate::domain::telemetry::TimeSeriesPoint;
use crate::domain::time::seconds_between;
use crate::error::DataError;
use crate::infrastructure::config::SolcastSettings;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

const MAX_PAST_HOURS: u32 = 24 * 7;
const MAX_FUTURE_HOURS: u32 = 24 * 14;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolcastError {
    #[error("weather query is empty: {0}")]
    EmptyQuery(String),

    #[error("query contained invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Solcast API key is invalid: {0}")]
    InvalidApiKey(String),

    #[error("API request usage limits have been exceeded: {0}")]
    UsageLimit(String),

    #[error("unexpected Solcast response {code}: {detail}")]
    Unexpected { code: u16, detail: String },

    #[error("unrecognized Solcast period `{0}`")]
    UnknownPeriod(String),

    #[error("unrecognized Solcast output `{0}`")]
    UnknownOutput(String),

    #[error("end time must be after start time")]
    EmptyRange,

    #[error("cannot query weather further than 7 days into the past")]
    TooFarInPast,

    #[error("cannot query weather further than 14 days into the future")]
    TooFarInFuture,
}

impl SolcastError {
    pub fn from_status(code: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match code {
            202 => SolcastError::EmptyQuery(detail),
            400 => SolcastError::InvalidParameters(detail),
            401 => SolcastError::InvalidApiKey(detail),
            402 | 429 => SolcastError::UsageLimit(detail),
            code => SolcastError::Unexpected { code, detail },
        }
    }
}

/// Temporal granularity of Solcast radiation and weather data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolcastPeriod {
    PT5M,
    PT10M,
    PT15M,
    PT20M,
    PT30M,
    PT60M,
}

impl SolcastPeriod {
    pub const ALL: [SolcastPeriod; 6] = [
        SolcastPeriod::PT5M,
        SolcastPeriod::PT10M,
        SolcastPeriod::PT15M,
        SolcastPeriod::PT20M,
        SolcastPeriod::PT30M,
        SolcastPeriod::PT60M,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SolcastPeriod::PT5M => "PT5M",
            SolcastPeriod::PT10M => "PT10M",
            SolcastPeriod::PT15M => "PT15M",
            SolcastPeriod::PT20M => "PT20M",
            SolcastPeriod::PT30M => "PT30M",
            SolcastPeriod::PT60M => "PT60M",
        }
    }

    /// Samples per hour.
    pub fn as_frequency(&self) -> u32 {
        match self {
            SolcastPeriod::PT5M => 12,
            SolcastPeriod::PT10M => 6,
            SolcastPeriod::PT15M => 4,
            SolcastPeriod::PT20M => 3,
            SolcastPeriod::PT30M => 2,
            SolcastPeriod::PT60M => 1,
        }
    }

    pub fn seconds(&self) -> f64 {
        3600.0 / f64::from(self.as_frequency())
    }
}

impl FromStr for SolcastPeriod {
    type Err = SolcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| SolcastError::UnknownPeriod(s.to_string()))
    }
}

macro_rules! solcast_outputs {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Output parameters of the Solcast radiation and weather endpoints.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SolcastOutput {
            $($variant),+
        }

        impl SolcastOutput {
            pub const ALL: &'static [SolcastOutput] = &[$(SolcastOutput::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(SolcastOutput::$variant => $name),+
                }
            }
        }
    };
}

solcast_outputs! {
    AirTemperature => "air_temp",
    Albedo => "albedo",
    Azimuth => "azimuth",
    Cape => "cape",
    ClearskyDhi => "clearsky_dhi",
    ClearskyDni => "clearsky_dni",
    ClearskyGhi => "clearsky_ghi",
    ClearskyGti => "clearsky_gti",
    CloudOpacity => "cloud_opacity",
    CloudOpacity10 => "cloud_opacity10",
    CloudOpacity90 => "cloud_opacity90",
    DewpointTemp => "dewpoint_temp",
    Dhi => "dhi",
    Dhi10 => "dhi10",
    Dhi90 => "dhi90",
    Dni => "dni",
    Dni10 => "dni10",
    Dni90 => "dni90",
    Ghi => "ghi",
    Ghi10 => "ghi10",
    Ghi90 => "ghi90",
    Gti => "gti",
    Gti10 => "gti10",
    Gti90 => "gti90",
    PrecipitableWater => "precipitable_water",
    PrecipitationRate => "precipitation_rate",
    RelativeHumidity => "relative_humidity",
    SurfacePressure => "surface_pressure",
    SnowDepth => "snow_depth",
    SnowSoilingRooftop => "snow_soiling_rooftop",
    SnowSoilingGround => "snow_soiling_ground",
    SnowWaterEquivalent => "snow_water_equivalent",
    SnowfallRate => "snowfall_rate",
    WindDirection100m => "wind_direction_100m",
    WindDirection10m => "wind_direction_10m",
    WindGust => "wind_gust",
    WindSpeed100m => "wind_speed_100m",
    WindSpeed10m => "wind_speed_10m",
    Zenith => "zenith",
}

impl SolcastOutput {
    /// Percentile outputs only exist in forecasts, never in live estimates.
    pub fn is_forecast_only(&self) -> bool {
        matches!(
            self,
            SolcastOutput::Dhi10
                | SolcastOutput::Dhi90
                | SolcastOutput::Dni10
                | SolcastOutput::Dni90
                | SolcastOutput::Ghi10
                | SolcastOutput::Ghi90
                | SolcastOutput::Gti10
                | SolcastOutput::Gti90
        )
    }
}

impl FromStr for SolcastOutput {
    type Err = SolcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|output| output.as_str() == s)
            .ok_or_else(|| SolcastError::UnknownOutput(s.to_string()))
    }
}

/// Round a duration in seconds to whole hours.
///
/// Under a minute rounds to zero. Otherwise a remainder of less than a minute
/// past the hour rounds down and anything longer rounds up.
pub fn round_to_hour(seconds: f64) -> u32 {
    if seconds < 60.0 {
        return 0;
    }

    let exact_hours = seconds / 3600.0;
    let whole_hours = (seconds / 3600.0).floor();
    let truncation = (exact_hours - whole_hours) * 3600.0;

    if truncation < 60.0 {
        whole_hours as u32
    } else {
        exact_hours.ceil() as u32
    }
}

/// Hours of live history and of forecast needed to cover `[start, end]` as seen from `now`.
pub fn plan_hours(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(u32, u32), SolcastError> {
    if end <= start {
        return Err(SolcastError::EmptyRange);
    }

    let past_hours = round_to_hour(seconds_between(&start, &now));
    if past_hours > MAX_PAST_HOURS {
        return Err(SolcastError::TooFarInPast);
    }

    let future_hours = round_to_hour(seconds_between(&now, &end));
    if future_hours > MAX_FUTURE_HOURS {
        return Err(SolcastError::TooFarInFuture);
    }

    Ok((past_hours, future_hours))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolcastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub period: SolcastPeriod,
    pub outputs: Vec<SolcastOutput>,
    pub tilt: f64,
    pub azimuth: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SolcastRequest {
    /// Request every configured output for `[start, end]` at the configured site.
    pub fn from_settings(
        settings: &SolcastSettings,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, SolcastError> {
        let outputs = settings
            .outputs
            .iter()
            .map(|output| output.parse())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            latitude: settings.latitude,
            longitude: settings.longitude,
            period: settings.period.parse()?,
            outputs,
            tilt: settings.tilt,
            azimuth: settings.azimuth,
            start,
            end,
        })
    }
}

/// One period of weather data; `values` follow the order of the requested outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub time: DateTime<Utc>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Live,
    Forecast,
}

impl Endpoint {
    fn path(&self) -> &'static str {
        match self {
            Endpoint::Live => "data/live/radiation_and_weather",
            Endpoint::Forecast => "data/forecast/radiation_and_weather",
        }
    }

    fn records_key(&self) -> &'static str {
        match self {
            Endpoint::Live => "estimated_actuals",
            Endpoint::Forecast => "forecasts",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolcastClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SolcastClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch weather covering the request window, stitching live estimates
    /// for the past onto forecasts for the future.
    pub async fn query(
        &self,
        request: &SolcastRequest,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<WeatherRecord>> {
        let (past_hours, future_hours) = plan_hours(request.start, request.end, now)?;
        tracing::debug!(
            "Solcast query needs {} past and {} future hours",
            past_hours,
            future_hours
        );

        let live = if past_hours > 0 {
            self.fetch(Endpoint::Live, request, past_hours).await?
        } else {
            Vec::new()
        };
        let forecast = if future_hours > 0 {
            self.fetch(Endpoint::Forecast, request, future_hours).await?
        } else {
            Vec::new()
        };

        let merged = merge_live_and_forecast(live, forecast);
        if merged.is_empty() {
            return Err(SolcastError::EmptyQuery("no records returned".to_string()).into());
        }
        Ok(merged)
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        request: &SolcastRequest,
        hours: u32,
    ) -> anyhow::Result<Vec<WeatherRecord>> {
        let url = format!("{}/{}", self.base_url, endpoint.path());
        let outputs: Vec<&str> = request
            .outputs
            .iter()
            .filter(|output| endpoint == Endpoint::Forecast || !output.is_forecast_only())
            .map(|output| output.as_str())
            .collect();

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("latitude", request.latitude.to_string()),
                ("longitude", request.longitude.to_string()),
                ("hours", hours.to_string()),
                ("output_parameters", outputs.join(",")),
                ("tilt", request.tilt.to_string()),
                ("azimuth", request.azimuth.to_string()),
                ("period", request.period.as_str().to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(SolcastError::from_status(status, body).into());
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse Solcast response")?;
        parse_records(&body, endpoint.records_key(), &request.outputs)
    }
}

/// Parse the record array under `key`. Outputs absent from a record become NaN.
fn parse_records(
    body: &Value,
    key: &str,
    outputs: &[SolcastOutput],
) -> anyhow::Result<Vec<WeatherRecord>> {
    let entries = body
        .get(key)
        .and_then(Value::as_array)
        .with_context(|| format!("Solcast response has no `{}` array", key))?;

    let mut records = Vec::with_capacity(entries.len());
    for entry in entries {
        let period_end = entry
            .get("period_end")
            .and_then(Value::as_str)
            .context("Solcast record has no `period_end`")?;
        let time = DateTime::parse_from_rfc3339(period_end)
            .with_context(|| format!("Invalid `period_end` {}", period_end))?
            .with_timezone(&Utc);
        let values = outputs
            .iter()
            .map(|output| {
                entry
                    .get(output.as_str())
                    .and_then(Value::as_f64)
                    .unwrap_or(f64::NAN)
            })
            .collect();
        records.push(WeatherRecord { time, values });
    }
    records.sort_by_key(|record| record.time);
    Ok(records)
}

/// Concatenate live and forecast records, preferring the live record when
/// both report the same period.
pub fn merge_live_and_forecast(
    live: Vec<WeatherRecord>,
    forecast: Vec<WeatherRecord>,
) -> Vec<WeatherRecord> {
    let overlap = match (live.last(), forecast.first()) {
        (Some(last_live), Some(first_forecast)) => last_live.time == first_forecast.time,
        _ => false,
    };

    let mut merged = live;
    merged.extend(forecast.into_iter().skip(usize::from(overlap)));
    merged.sort_by_key(|record| record.time);
    merged
}

/// Turn merged weather records into one uniform series per requested output.
pub fn weather_series(
    records: &[WeatherRecord],
    outputs: &[SolcastOutput],
    period: SolcastPeriod,
) -> Result<Vec<UniformSeries>, DataError> {
    outputs
        .iter()
        .enumerate()
        .map(|(idx, output)| {
            let rows: Vec<TimeSeriesPoint> = records
                .iter()
                .filter_map(|record| {
                    let value = *record.values.get(idx)?;
                    (!value.is_nan()).then_some(TimeSeriesPoint::new(record.time, value))
                })
                .collect();
            UniformSeries::from_rows(&rows, period.seconds(), output.as_str(), "")
                .map(|series| series.with_measurement("solcast"))
        })
        .collect()
}
