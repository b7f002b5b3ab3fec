// InfluxDB repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::telemetry::TimeSeriesPoint;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct InfluxRepository {
    client: reqwest::Client,
    host: String,
    token: String,
    database: String,
    retention_policy: String,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResponse {
    results: Vec<InfluxQLResult>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLResult {
    #[serde(default)]
    series: Option<Vec<InfluxQLSeries>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluxQLSeries {
    #[allow(dead_code)]
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl InfluxRepository {
    pub fn new(host: String, token: String, database: String, retention_policy: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
            database,
            retention_policy,
        }
    }

    fn build_query_url(&self, query: &str) -> String {
        let encoded_query = urlencoding::encode(query);
        format!(
            "{}/query?db={}&rp={}&epoch=ns&q={}",
            self.host, self.database, self.retention_policy, encoded_query
        )
    }

    async fn execute_query(&self, query: &str) -> Result<InfluxQLResponse> {
        let url = self.build_query_url(query);
        tracing::debug!("Executing InfluxQL query: {}", query);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to InfluxDB")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("InfluxDB query failed with status {}: {}", status, body);
        }

        let data = response
            .json::<InfluxQLResponse>()
            .await
            .context("Failed to parse InfluxDB response")?;

        // Check for errors in the response
        if let Some(result) = data.results.first() {
            if let Some(error) = &result.error {
                anyhow::bail!("InfluxDB query error: {}", error);
            }
        }

        Ok(data)
    }

    /// Collect the string in `column` of every row of every series.
    fn column_strings(response: &InfluxQLResponse, column: &str) -> Vec<String> {
        let mut values = Vec::new();
        for result in &response.results {
            for series in result.series.iter().flatten() {
                let Some(idx) = series.columns.iter().position(|c| c == column) else {
                    continue;
                };
                for row in &series.values {
                    if let Some(value) = row.get(idx).and_then(|v| v.as_str()) {
                        values.push(value.to_string());
                    }
                }
            }
        }
        values.sort();
        values.dedup();
        values
    }

    /// Extract `(time, value)` rows; the value is the first column that is not `time`.
    fn points_from_response(response: &InfluxQLResponse) -> Vec<TimeSeriesPoint> {
        let mut points = Vec::new();
        let mut skipped = 0usize;

        for result in &response.results {
            for series in result.series.iter().flatten() {
                let time_idx = series.columns.iter().position(|c| c == "time").unwrap_or(0);
                let Some(value_idx) = series.columns.iter().position(|c| c != "time") else {
                    continue;
                };

                for row in &series.values {
                    let time = row.get(time_idx).and_then(parse_time);
                    let value = row.get(value_idx).and_then(|v| v.as_f64());
                    match (time, value) {
                        (Some(time), Some(value)) => points.push(TimeSeriesPoint::new(time, value)),
                        _ => skipped += 1,
                    }
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} rows with a missing time or non-numeric value", skipped);
        }
        points
    }
}

/// Double-quote an InfluxQL identifier, escaping backslashes and embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Accepts epoch nanoseconds (`epoch=ns`) or RFC 3339 strings.
fn parse_time(value: &serde_json::Value) -> Option<chrono::DateTime<chrono::Utc>> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().map(chrono::DateTime::<chrono::Utc>::from_timestamp_nanos),
        serde_json::Value::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&chrono::Utc)),
        _ => None,
    }
}

#[async_trait]
impl TelemetryRepository for InfluxRepository {
    async fn list_measurements(&self) -> Result<Vec<String>> {
        let response = self.execute_query("SHOW MEASUREMENTS").await?;
        Ok(Self::column_strings(&response, "name"))
    }

    async fn list_fields(&self, measurement: &str) -> Result<Vec<String>> {
        let query = format!("SHOW FIELD KEYS FROM {}", quote_identifier(measurement));
        let response = self.execute_query(&query).await?;
        Ok(Self::column_strings(&response, "fieldKey"))
    }

    async fn query_points(&self, query: &str) -> Result<Vec<TimeSeriesPoint>> {
        let response = self.execute_query(query).await?;
        let points = Self::points_from_response(&response);
        tracing::debug!("Query returned {} points", points.len());
        Ok(points)
    }
}
