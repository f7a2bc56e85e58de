use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::data::{DEFAULT_PREVIEW_ROWS, MAX_PREVIEW_ROWS};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "STOCK_DASHBOARD_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ticker")]
    pub ticker: String,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignalsConfig {
    /// Fixed seed for the placeholder signal source. Unset means a fresh roll each run.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_refresh_rate_ms")]
    pub refresh_rate_ms: u64,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_ticker() -> String {
    "TATASTEEL.NS".to_string()
}

fn default_range() -> String {
    "1y".to_string()
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("tata.csv")
}

fn default_refresh_rate_ms() -> u64 {
    100
}

fn default_preview_rows() -> usize {
    DEFAULT_PREVIEW_ROWS
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            ticker: default_ticker(),
            range: default_range(),
            base_url: default_base_url(),
            output_path: default_output_path(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            refresh_rate_ms: default_refresh_rate_ms(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
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

/// Yahoo chart API ranges accepted for the history fetch.
pub const SUPPORTED_RANGES: [&str; 9] = ["1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"];

impl FetchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            bail!("fetch.ticker must not be empty");
        }
        if !SUPPORTED_RANGES.contains(&self.range.as_str()) {
            bail!(
                "invalid fetch.range '{}': expected one of {}",
                self.range,
                SUPPORTED_RANGES.join("/")
            );
        }
        Ok(())
    }
}

impl Config {
    /// Load `config/default.toml` (or `$STOCK_DASHBOARD_CONFIG`). A missing file yields defaults.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_path(&config_path)
    }

    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config = Self::from_toml(&config_str)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        Ok(config)
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        config.fetch.validate().context("fetch section is invalid")?;
        if config.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        if config.ui.preview_rows > MAX_PREVIEW_ROWS {
            bail!(
                "ui.preview_rows must be at most {} (got {})",
                MAX_PREVIEW_ROWS,
                config.ui.preview_rows
            );
        }
        Ok(config)
    }
}
