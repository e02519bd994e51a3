use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

/// Locations of the fund catalog and the country classification tables.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DataConfig {
    pub catalog: PathBuf,
    pub geography: PathBuf,
    pub market_status: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            catalog: PathBuf::from("data/etfs.json"),
            geography: PathBuf::from("data/country-by-continent.json"),
            market_status: PathBuf::from("data/country-by-status.json"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            decimal_separator: ',',
            thousands_separator: Some('.'),
        }
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_top_countries() -> usize {
    20
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub number_format: NumberFormat,
    #[serde(default = "default_top_countries")]
    pub top_countries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data: DataConfig::default(),
            currency: default_currency(),
            number_format: NumberFormat::default(),
            top_countries: default_top_countries(),
        }
    }
}

impl AppConfig {
    /// Loads the config at the default location, or built-in defaults when
    /// none has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fundscope", "fundscope")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
