// Main entry point - Dependency injection and analysis jobs
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use solar_data_tools::application::data_source::{DataSource, FileLoader};
use solar_data_tools::application::lap_service::collect_lap_data;
use solar_data_tools::application::series_service::SeriesService;
use solar_data_tools::domain::file::FileData;
use solar_data_tools::domain::laps::LapTable;
use solar_data_tools::infrastructure::config::{
    load_config, AnalysisConfig, AppConfig, LapSettings, SolcastSettings, CONFIG_PATH_VAR,
    DEFAULT_CONFIG_PATH,
};
use solar_data_tools::infrastructure::influx_repository::InfluxRepository;
use solar_data_tools::infrastructure::solcast::{weather_series, SolcastClient, SolcastRequest};
use solar_data_tools::infrastructure::sunbeam_client::SunbeamClient;
use solar_data_tools::FetchResult;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config_path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::new(
        config.influx.host.clone(),
        config.influx.token.clone(),
        config.influx.database.clone(),
        config.influx.retention_policy.clone(),
    ));

    // Create services (application layer)
    let series_service = SeriesService::new(repository, config.targets.clone());

    let measurements = series_service.list_measurements().await?;
    tracing::info!(
        "Connected to {} with {} measurements",
        config.influx.database,
        measurements.len()
    );

    if let Some(analysis) = &config.analysis {
        run_analysis(&series_service, analysis).await?;
    }

    if let Some(laps) = &config.laps {
        run_laps(&series_service, laps, &lap_targets(&config)).await?;
    }

    if !config.sunbeam.files.is_empty() {
        fetch_files(&config).await;
    }

    if let (Some(solcast), Some(analysis)) = (&config.solcast, &config.analysis) {
        run_weather(solcast, analysis).await?;
    }

    Ok(())
}

async fn run_analysis(service: &SeriesService, analysis: &AnalysisConfig) -> anyhow::Result<()> {
    let aligned = service
        .query_aligned(&analysis.targets, &analysis.event, analysis.align)
        .await?;

    for (name, series) in analysis.targets.iter().zip(&aligned) {
        tracing::info!(
            "{}: {} samples at {}s from {} (mean {:.3} {})",
            name,
            series.len(),
            series.granularity(),
            series.start(),
            series.mean(),
            series.units()
        );
    }
    Ok(())
}

fn lap_targets(config: &AppConfig) -> Vec<String> {
    match &config.analysis {
        Some(analysis) => analysis.targets.clone(),
        None => config.targets.iter().map(|target| target.name.clone()).collect(),
    }
}

async fn run_laps(
    service: &SeriesService,
    laps: &LapSettings,
    targets: &[String],
) -> anyhow::Result<()> {
    let tables = laps
        .days
        .iter()
        .map(|day| LapTable::load(&laps.dir, *day))
        .collect::<Result<Vec<_>, _>>()?;

    for name in targets {
        let means = collect_lap_data(&tables, |event| {
            let service = service.clone();
            let name = name.clone();
            async move { Ok(service.query_named(&name, &event).await?.mean()) }
        })
        .await?;
        tracing::info!("Per-lap mean of {}: {:?}", name, means);
    }
    Ok(())
}

async fn fetch_files(config: &AppConfig) {
    let source: Arc<dyn DataSource> = Arc::new(SunbeamClient::new(config.sunbeam.url.clone()));

    for path in &config.sunbeam.files {
        let loader = FileLoader::new(source.clone(), path.clone());
        match loader.load().await {
            FetchResult::Ok(file) => match file.data() {
                FileData::TimeSeries(series) => {
                    tracing::info!("{}: time series of {} samples", path, series.len())
                }
                FileData::Scalar(value) => tracing::info!("{}: {}", path, value),
                FileData::Other(_) => {
                    tracing::info!("{}: {}", path, file.file_type().as_str())
                }
            },
            FetchResult::Err(error) => tracing::error!("{}", error),
        }
    }
}

async fn run_weather(settings: &SolcastSettings, analysis: &AnalysisConfig) -> anyhow::Result<()> {
    let client = SolcastClient::new(settings.url.clone(), settings.api_key.clone());
    let request =
        SolcastRequest::from_settings(settings, analysis.event.start(), analysis.event.stop())?;

    let records = client.query(&request, Utc::now()).await?;
    for series in weather_series(&records, &request.outputs, request.period)? {
        tracing::info!(
            "Weather {}: {} samples (mean {:.3})",
            series.field(),
            series.len(),
            series.mean()
        );
    }
    Ok(())
}
