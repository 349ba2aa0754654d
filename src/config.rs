//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.gagstock.toml` files. Every value has a default, so the file is optional.

use crate::stock::AggregationPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".gagstock.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Stock pipeline settings.
    #[serde(default)]
    pub stock: StockConfig,

    /// Weather pipeline settings.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Chat delivery settings.
    #[serde(default)]
    pub chat: ChatConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Stock endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Base URL of the stock site.
    #[serde(default = "default_stock_base_url")]
    pub base_url: String,

    /// Behavior when some categories fail.
    #[serde(default)]
    pub policy: AggregationPolicy,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            base_url: default_stock_base_url(),
            policy: AggregationPolicy::default(),
        }
    }
}

fn default_stock_base_url() -> String {
    "https://growagardenvalues.com".to_string()
}

/// Weather endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the weather API.
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Also rewrite timestamped records found inside arrays.
    #[serde(default)]
    pub traverse_arrays: bool,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            traverse_arrays: false,
        }
    }
}

fn default_weather_base_url() -> String {
    "https://growagarden.gg".to_string()
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds. Unset means no client-side timeout.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Chat delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Seconds before a sent stock report is removed again.
    #[serde(default = "default_unsend_delay")]
    pub unsend_delay_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            unsend_delay_seconds: default_unsend_delay(),
        }
    }
}

fn default_unsend_delay() -> u64 {
    40
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the weather route listens on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.gagstock.toml` from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = Some(timeout);
        }

        if args.partial {
            self.stock.policy = AggregationPolicy::Partial;
        }

        if args.traverse_arrays {
            self.weather.traverse_arrays = true;
        }

        if let Some(crate::cli::Command::Serve { bind: Some(bind) }) = &args.command {
            self.server.bind = *bind;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
