// Repository trait for time-series database access
use crate::domain::telemetry::TimeSeriesPoint;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// List the measurements stored in the database
    async fn list_measurements(&self) -> anyhow::Result<Vec<String>>;

    /// List the field keys recorded under a measurement
    async fn list_fields(&self, measurement: &str) -> anyhow::Result<Vec<String>>;

    /// Execute a query returning one value column, ordered by time
    async fn query_points(&self, query: &str) -> anyhow::Result<Vec<TimeSeriesPoint>>;
}
