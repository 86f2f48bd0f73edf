//! Configuration loading for the TSC CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use tsc_analysis::{Criterion, ImageFormat};

/// Configuration for the CLI
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub plot: PlotConfig,
    pub rank: RankConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlotConfig {
    pub xaxis: String,
    pub yaxis: String,
    pub moving_average: usize,
    pub separator: char,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub output_dir: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            xaxis: "step".to_string(),
            yaxis: tsc_core::Metric::DEFAULT_COLUMN.to_string(),
            moving_average: 1,
            separator: ',',
            x_label: "Time step (seconds)".to_string(),
            y_label: "Total waiting time (s)".to_string(),
            width: 1200,
            height: 800,
            format: ImageFormat::Png,
            output_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RankConfig {
    pub criterion: Criterion,
    pub tail_fraction: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            criterion: Criterion::Mean,
            tail_fraction: 0.1,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Returns the file that was used, if any, so it can be logged once the
    /// subscriber is up.
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        let config_path = Self::find_config_file();
        let config = Self::load_from(config_path.as_deref())?;
        Ok((config, config_path))
    }

    /// Defaults, then `path`, then `TSC__SECTION__KEY` environment overrides
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("TSC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Find the configuration file
    pub fn find_config_file() -> Option<PathBuf> {
        // Check in order: TSC_CONFIG env, ./tsc.toml, ~/.config/tsc/tsc.toml
        if let Ok(path) = std::env::var("TSC_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let local = PathBuf::from("tsc.toml");
        if local.exists() {
            return Some(local);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".config").join("tsc").join("tsc.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
