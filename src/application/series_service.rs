// Series service - Use case for fetching telemetry as aligned uniform series
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::event::EventWindow;
use crate::domain::series::{AlignOptions, UniformSeries};
use crate::infrastructure::config::{prepare_query, TimeSeriesTarget};
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct SeriesService {
    repository: Arc<dyn TelemetryRepository>,
    targets: HashMap<String, TimeSeriesTarget>,
}

impl SeriesService {
    pub fn new(repository: Arc<dyn TelemetryRepository>, targets: Vec<TimeSeriesTarget>) -> Self {
        Self {
            repository,
            targets: targets
                .into_iter()
                .map(|target| (target.name.clone(), target))
                .collect(),
        }
    }

    pub fn target(&self, name: &str) -> anyhow::Result<&TimeSeriesTarget> {
        self.targets
            .get(name)
            .with_context(|| format!("No time-series target named `{}` is configured", name))
    }

    pub async fn list_measurements(&self) -> anyhow::Result<Vec<String>> {
        self.repository.list_measurements().await
    }

    pub async fn list_fields(&self, measurement: &str) -> anyhow::Result<Vec<String>> {
        self.repository.list_fields(measurement).await
    }

    /// Query one target over `window` and resample it to the target's granularity.
    pub async fn query_series(
        &self,
        target: &TimeSeriesTarget,
        window: &EventWindow,
    ) -> anyhow::Result<UniformSeries> {
        if window.stop() <= window.start() {
            anyhow::bail!(
                "Event `{}` stops at {} which is not after its start {}",
                window.name(),
                window.stop_iso(),
                window.start_iso()
            );
        }

        let query = prepare_query(target.query_template(), &Self::query_vars(target, window));
        let points = self
            .repository
            .query_points(&query)
            .await
            .with_context(|| format!("Failed to query `{}`", target.name))?;

        if points.is_empty() {
            anyhow::bail!(
                "Query for `{}` returned no data between {} and {}",
                target.name,
                window.start_iso(),
                window.stop_iso()
            );
        }

        tracing::debug!(
            "Fetched {} points for {} during {}",
            points.len(),
            target.name,
            window.name()
        );

        let series =
            UniformSeries::from_rows(&points, target.granularity, &target.field, &target.units)?;
        Ok(series.with_measurement(target.measurement.clone()))
    }

    pub async fn query_named(
        &self,
        name: &str,
        window: &EventWindow,
    ) -> anyhow::Result<UniformSeries> {
        let target = self.target(name)?;
        self.query_series(target, window).await
    }

    /// Fetch every named target concurrently, then align them onto one time axis.
    pub async fn query_aligned(
        &self,
        names: &[String],
        window: &EventWindow,
        options: AlignOptions,
    ) -> anyhow::Result<Vec<UniformSeries>> {
        let fetches = names.iter().map(|name| self.query_named(name, window));
        let series = futures::future::try_join_all(fetches).await?;

        let refs: Vec<&UniformSeries> = series.iter().collect();
        let aligned = UniformSeries::align_with(&refs, options)
            .with_context(|| format!("Failed to align {} during {}", names.join(", "), window.name()))?;
        Ok(aligned)
    }

    fn query_vars(target: &TimeSeriesTarget, window: &EventWindow) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("start".to_string(), window.start_iso());
        vars.insert("stop".to_string(), window.stop_iso());
        vars.insert("field".to_string(), target.field.clone());
        vars.insert("measurement".to_string(), target.measurement.clone());
        vars
    }
}
