//! Bootstrap configuration
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments / environment (applied by the binary)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)
//!
//! A missing default config file is not fatal: a warning is logged and the
//! built-in defaults are used. An explicitly requested file must exist.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::InterruptionType;
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "BLACKOUT_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Structural (buildings/interruptions) SQLite database
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Weather SQLite database; weather enrichment is skipped when unset
    #[serde(default)]
    pub weather_database_path: Option<PathBuf>,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Single web origin allowed by CORS; no CORS layer when unset
    #[serde(default)]
    pub cors_origin: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub estimator: EstimatorConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Neighbor discovery and enrichment tuning
#[derive(Debug, Clone, Deserialize)]
pub struct ResolutionConfig {
    /// Half-width of the neighbor bounding box, in degrees
    #[serde(default = "default_coord_delta")]
    pub coord_delta: f64,

    /// Maximum interruptions enriched concurrently per request
    #[serde(default = "default_enrichment_concurrency")]
    pub enrichment_concurrency: usize,
}

/// Duration estimator collaborator
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatorConfig {
    /// Prediction endpoint; every estimate abstains when unset
    #[serde(default)]
    pub url: Option<String>,

    /// Upper bound on a single prediction call
    #[serde(default = "default_estimator_timeout_ms")]
    pub timeout_ms: u64,

    /// Types the model was trained for; others abstain without a call
    #[serde(default = "default_supported_types")]
    pub supported_types: Vec<InterruptionType>,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("databases/dataset.db")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_coord_delta() -> f64 {
    0.01
}

fn default_enrichment_concurrency() -> usize {
    4
}

fn default_estimator_timeout_ms() -> u64 {
    2000
}

fn default_supported_types() -> Vec<InterruptionType> {
    vec![
        InterruptionType::Electricity,
        InterruptionType::ColdWater,
        InterruptionType::Heat,
    ]
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            weather_database_path: None,
            host: default_host(),
            port: default_port(),
            cors_origin: None,
            logging: LoggingConfig::default(),
            resolution: ResolutionConfig::default(),
            estimator: EstimatorConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            coord_delta: default_coord_delta(),
            enrichment_concurrency: default_enrichment_concurrency(),
        }
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_ms: default_estimator_timeout_ms(),
            supported_types: default_supported_types(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration
    ///
    /// `explicit` (CLI or [`CONFIG_ENV_VAR`]) must exist. Otherwise the
    /// platform default location is tried and defaults are used if it is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                other => {
                    warn!(
                        "No config file at {}; using built-in defaults",
                        other
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<no config dir>".to_string())
                    );
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values the resolver cannot work with
    pub fn validate(&self) -> Result<()> {
        let delta = self.resolution.coord_delta;
        if !delta.is_finite() || delta <= 0.0 {
            return Err(Error::Config(format!(
                "resolution.coord_delta must be a positive number, got {}",
                delta
            )));
        }
        if self.resolution.enrichment_concurrency == 0 {
            return Err(Error::Config(
                "resolution.enrichment_concurrency must be at least 1".to_string(),
            ));
        }
        if self.estimator.timeout_ms == 0 {
            return Err(Error::Config(
                "estimator.timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config dir>/blackout/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("blackout").join("config.toml"))
}
