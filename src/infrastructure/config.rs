use crate::domain::canonical_path::CanonicalPath;
use crate::domain::event::EventWindow;
use crate::domain::series::AlignOptions;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/data_tools";
pub const CONFIG_PATH_VAR: &str = "DATA_TOOLS_CONFIG";
pub const ENV_PREFIX: &str = "DATA_TOOLS";

/// InfluxQL selecting one field of one measurement over the query window.
pub const DEFAULT_QUERY: &str =
    r#"SELECT "${field}" FROM "${measurement}" WHERE time >= '${start}' AND time < '${stop}'"#;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub influx: InfluxSettings,
    #[serde(default)]
    pub sunbeam: SunbeamSettings,
    #[serde(default)]
    pub solcast: Option<SolcastSettings>,
    #[serde(default)]
    pub laps: Option<LapSettings>,
    #[serde(default)]
    pub targets: Vec<TimeSeriesTarget>,
    #[serde(default)]
    pub analysis: Option<AnalysisConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    #[serde(default = "default_retention_policy")]
    pub retention_policy: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SunbeamSettings {
    #[serde(default = "default_sunbeam_url")]
    pub url: String,
    /// Files to fetch on startup
    #[serde(default)]
    pub files: Vec<CanonicalPath>,
}

impl Default for SunbeamSettings {
    fn default() -> Self {
        Self {
            url: default_sunbeam_url(),
            files: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolcastSettings {
    pub api_key: String,
    #[serde(default = "default_solcast_url")]
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub tilt: f64,
    #[serde(default)]
    pub azimuth: f64,
    #[serde(default = "default_solcast_period")]
    pub period: String,
    #[serde(default)]
    pub outputs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LapSettings {
    pub dir: PathBuf,
    #[serde(default)]
    pub days: Vec<u32>,
}

/// A named field that can be queried into a `UniformSeries`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimeSeriesTarget {
    pub name: String,
    pub measurement: String,
    pub field: String,
    #[serde(default)]
    pub units: String,
    #[serde(default = "default_granularity")]
    pub granularity: f64,
    /// Query template; `DEFAULT_QUERY` when absent
    #[serde(default)]
    pub query: Option<String>,
}

impl TimeSeriesTarget {
    pub fn query_template(&self) -> &str {
        self.query.as_deref().unwrap_or(DEFAULT_QUERY)
    }
}

/// Targets to fetch over one event and align.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    pub event: EventWindow,
    pub targets: Vec<String>,
    #[serde(default)]
    pub align: AlignOptions,
}

fn default_retention_policy() -> String {
    "autogen".to_string()
}

fn default_sunbeam_url() -> String {
    "http://api.sunbeam.ubcsolar.com".to_string()
}

fn default_solcast_url() -> String {
    "https://api.solcast.com.au".to_string()
}

fn default_solcast_period() -> String {
    "PT30M".to_string()
}

fn default_granularity() -> f64 {
    0.1
}

/// Load configuration from `path` (any format the `config` crate recognizes),
/// overridden by `DATA_TOOLS__SECTION__KEY` environment variables.
pub fn load_config(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn config_from_toml(contents: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(contents, config::FileFormat::Toml))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace template variables in a query string
pub fn prepare_query(query: &str, vars: &HashMap<String, String>) -> String {
    let mut result = query.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}
