//! CLI configuration.
//!
//! Settings come from a TOML file, either given with `--config` or found at the
//! platform config directory:
//! - Linux: `~/.config/etfscope/config.toml`
//! - macOS: `~/Library/Application Support/etfscope/config.toml`
//! - Windows: `%APPDATA%\etfscope\config.toml`
//!
//! Missing keys fall back to [`AppConfig::default`]. Command-line flags override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading the configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// Explicitly given file does not exist.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid TOML.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Tickers analysed when `--tickers` is not given.
    pub(crate) default_tickers: Vec<String>,
    /// Period used when `--period` is not given.
    pub(crate) period: String,
    /// Investment amount used when `--amount` is not given.
    pub(crate) investment_amount: f64,
    /// Directory charts and exports are written to.
    pub(crate) output_dir: PathBuf,
    /// Delay after each provider request, in milliseconds.
    pub(crate) rate_limit_ms: u64,
    /// Whether to fetch sector weights.
    pub(crate) fetch_sectors: bool,
    /// Log filter used when `RUST_LOG` is not set.
    pub(crate) log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_tickers: vec!["FXI".to_string(), "SPY".to_string()],
            period: "1y".to_string(),
            investment_amount: 10_000.0,
            output_dir: PathBuf::from("etfscope-output"),
            rate_limit_ms: 250,
            fetch_sectors: true,
            log_filter: "etfscope=info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or from the default location when it exists, or defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Provider rate limit.
    pub(crate) const fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

/// Default config file location.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("etfscope").join("config.toml"))
}
