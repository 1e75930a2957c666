//! Pipeline configuration management
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML file,
//! `DRAFT_`-prefixed environment variables (`__` between nested keys, e.g.
//! `DRAFT_PROJECTION__TOP_N=200`), then command-line flags.

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use projection_model::{ModelConfig, ProjectionConfig};
use roster_sources::SourcesConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "DRAFT";

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// NFL season to fetch rosters for
    pub season: i32,

    /// Provider order, timeouts and retry policy
    pub sources: SourcesConfig,

    /// Cross-validation and label settings
    pub training: TrainingConfig,

    /// Hyperparameters per model family
    pub model: ModelConfig,

    /// Ranking and presentation settings
    pub projection: ProjectionConfig,

    /// Where artifacts go
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of forward-only validation folds
    pub n_splits: usize,

    /// Seed of the label noise generator
    pub label_seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the artifact tree
    pub dir: PathBuf,

    /// Extra copy of the projections for the web app (e.g. `app/src/data.json`)
    pub app_data_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), overridden by `RUST_LOG`
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            season: 2024,
            sources: SourcesConfig::default(),
            training: TrainingConfig::default(),
            model: ModelConfig::default(),
            projection: ProjectionConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self { n_splits: 3, label_seed: projection_model::LABEL_SEED }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("./data"), app_data_path: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Command-line values that win over every other layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub season: Option<i32>,
    pub output_dir: Option<PathBuf>,
}

/// Load configuration from the optional file and the process environment
pub fn load_config(file: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    load_with_env(file, None, overrides)
}

/// Same as [`load_config`] with an explicit environment (`None` reads the process environment)
pub fn load_with_env(
    file: Option<&Path>,
    env: Option<HashMap<String, String>>,
    overrides: &Overrides,
) -> Result<PipelineConfig> {
    let mut builder = Config::builder();
    if let Some(path) = file {
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("sources.order")
            .try_parsing(true)
            .source(env),
    );

    let mut config: PipelineConfig = builder
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    if let Some(season) = overrides.season {
        config.season = season;
    }
    if let Some(dir) = &overrides.output_dir {
        config.output.dir = dir.clone();
    }

    validate_config(&config)?;
    Ok(config)
}

/// Reject settings that would only fail later, mid-run
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    match config.logging.level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.logging.level)),
    }

    match config.logging.format.as_str() {
        "json" | "pretty" | "compact" => {}
        _ => return Err(anyhow!("Invalid log format: {}", config.logging.format)),
    }

    if config.sources.order.is_empty() {
        tracing::warn!("No sources configured, the fallback dataset will be used");
    }
    if config.training.n_splits == 0 {
        return Err(anyhow!("training.n_splits must be positive"));
    }
    if config.projection.top_n == 0 {
        return Err(anyhow!("projection.top_n must be positive"));
    }
    if !(config.projection.projection_factor.is_finite() && config.projection.projection_factor > 0.0) {
        return Err(anyhow!("projection.projection_factor must be positive"));
    }

    config.model.validate().context("Invalid model configuration")?;
    Ok(())
}

impl PipelineConfig {
    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}
