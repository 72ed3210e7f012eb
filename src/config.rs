// Configuration loading (go_utils.toml, with `.env` support).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::logging::LogLevel;
use crate::model::DEFAULT_START_DATE;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "go_utils.toml";

/// Environment variable selecting a different configuration file.
pub const CONFIG_ENV_VAR: &str = "GO_UTILS_CONFIG";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub arcgis: ArcGisConfig,
    pub download: DownloadConfig,
    pub logging: LoggingConfig,
}

/// `[api]`: the GLOBE measurement search API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Must end with `/`; endpoint paths are appended to it.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://api.globe.gov/search/v1/measurement/protocol/measureddate/"
                .to_string(),
            timeout_secs: 300,
        }
    }
}

/// `[arcgis]`: country-enriched feature layers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArcGisConfig {
    pub portal_url: String,
    /// Records requested per feature-service query.
    pub page_size: usize,
}

impl Default for ArcGisConfig {
    fn default() -> Self {
        ArcGisConfig {
            portal_url: "https://www.arcgis.com/sharing/rest".to_string(),
            page_size: 2000,
        }
    }
}

/// `[download]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// `YYYY-MM-DD`
    pub default_start_date: String,
    pub photo_timeout_secs: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        DownloadConfig {
            default_start_date: DEFAULT_START_DATE.to_string(),
            photo_timeout_secs: 60,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(|message| ConfigError::ValidationError {
            field: "logging.level".to_string(),
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse configuration text and validate it.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Load configuration.
///
/// Resolution order: `explicit` path, then `GO_UTILS_CONFIG` (also read from
/// `.env`), then `go_utils.toml` in the working directory. Only the implicit
/// default file may be absent, in which case built-in defaults are used.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    dotenv::dotenv().ok();

    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match std::env::var(CONFIG_ENV_VAR) {
            Ok(p) => (PathBuf::from(p), true),
            Err(_) => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        },
    };

    if !path.exists() {
        if required {
            return Err(ConfigError::FileNotFound { path });
        }
        return Ok(Config::default());
    }

    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
        path: path.clone(),
        source,
    })?;
    parse_config(&text, &path)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !config.api.base_url.ends_with('/') {
        return Err(ConfigError::ValidationError {
            field: "api.base_url".to_string(),
            message: "must end with '/'".to_string(),
        });
    }
    if config.arcgis.page_size == 0 {
        return Err(ConfigError::ValidationError {
            field: "arcgis.page_size".to_string(),
            message: "must be greater than 0".to_string(),
        });
    }
    if chrono::NaiveDate::parse_from_str(&config.download.default_start_date, "%Y-%m-%d").is_err() {
        return Err(ConfigError::ValidationError {
            field: "download.default_start_date".to_string(),
            message: format!("'{}' is not YYYY-MM-DD", config.download.default_start_date),
        });
    }
    config.logging.level()?;
    Ok(())
}
