//! Draft Projections Pipeline
//!
//! Batch job wiring the stages together: roster acquisition with fallback,
//! normalization, ensemble training and projection publishing, driven by a
//! layered configuration and a small CLI.

use anyhow::{Context, Result};
use std::path::Path;

pub mod cli;
pub mod config;
pub mod logging;
pub mod pipeline;

pub use cli::{Cli, Command};
pub use config::{Overrides, PipelineConfig};
pub use logging::initialize_logging;
pub use pipeline::{Pipeline, RunSummary};

/// Load configuration from `.env`, the optional file and the environment
pub fn load_configuration(file: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    // A missing .env file is fine
    let _ = dotenv::dotenv();
    config::load_config(file, overrides).context("Failed to load pipeline configuration")
}
