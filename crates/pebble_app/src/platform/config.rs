//! Shell configuration, read from an optional RON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use pebble_core::{Symbol, SymbolError};
use pebble_engine::{ProviderSettings, DEFAULT_BASE_URL, DEFAULT_SEARCH_LIMIT};
use pebble_logging::pebble_warn;
use serde::Deserialize;

use super::logging::LogDestination;

const CONFIG_FILENAME: &str = "pebble.ron";
const API_KEY_ENV: &str = "PEBBLE_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid symbol {symbol:?}: {source}")]
    InvalidSymbol {
        symbol: String,
        #[source]
        source: SymbolError,
    },
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub symbols: Vec<String>,
    pub refresh_interval_secs: u64,
    pub base_url: String,
    pub api_key: String,
    pub request_timeout_secs: u64,
    pub search_limit: usize,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            refresh_interval_secs: 30,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "demo".to_string(),
            request_timeout_secs: 30,
            search_limit: DEFAULT_SEARCH_LIMIT,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parsed refresh symbols. An empty list is allowed; the board reports it
    /// as a refresh failure instead of refusing to start.
    pub fn symbols(&self) -> Result<Vec<Symbol>, ConfigError> {
        let symbols = self
            .symbols
            .iter()
            .map(|raw| {
                Symbol::parse(raw).map_err(|source| ConfigError::InvalidSymbol {
                    symbol: raw.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if symbols.is_empty() {
            pebble_warn!("no symbols configured");
        }
        Ok(symbols)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            search_limit: self.search_limit.max(1),
            ..ProviderSettings::default()
        }
    }
}

/// Loads `explicit` if given, else `./pebble.ron` when present, else defaults.
/// `PEBBLE_API_KEY` overrides the file's key.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match explicit {
        Some(path) => read_file(path)?,
        None => {
            let default_path = PathBuf::from(CONFIG_FILENAME);
            if default_path.is_file() {
                read_file(&default_path)?
            } else {
                AppConfig::default()
            }
        }
    };
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            config.api_key = key.trim().to_string();
        }
    }
    Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    AppConfig::from_ron(&text, path)
}
