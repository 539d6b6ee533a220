//! Screener settings: TOML file, then environment overrides, then command-line flags.
//!
//! Every key is optional; a missing file section falls back to the defaults below.
//!
//! ```toml
//! data_dir = "tickers"
//! results_dir = "results"
//! window_size = 121
//! markets = ["KOSPI", "KOSDAQ"]
//! concurrency = 1
//!
//! [krx]
//! base_url = "http://data.krx.co.kr"
//! requests_per_second = 5
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use market_data_ingestor::{models::asset::Market, providers::krx::KrxConfig};
use serde::Deserialize;
use shared_utils::env::get_env_var_opt;
use thiserror::Error;

/// Days in the screening window: today plus the 120 before it, which MA120 needs.
pub const MIN_WINDOW_SIZE: usize = 121;

pub const DATA_DIR_ENV: &str = "GAP_SCREENER_DATA_DIR";
pub const RESULTS_DIR_ENV: &str = "GAP_SCREENER_RESULTS_DIR";
pub const KRX_BASE_URL_ENV: &str = "KRX_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreenerConfig {
    /// Cache root: bars under `prices/`, universe snapshots under `list/`.
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub window_size: usize,
    pub markets: Vec<Market>,
    /// Tickers fetched at once. Reports keep universe order regardless.
    pub concurrency: usize,
    pub krx: KrxSection,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("tickers"),
            results_dir: PathBuf::from("results"),
            window_size: MIN_WINDOW_SIZE,
            markets: Market::ALL.to_vec(),
            concurrency: 1,
            krx: KrxSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KrxSection {
    pub base_url: String,
    pub user_agent: String,
    pub requests_per_second: u32,
}

impl Default for KrxSection {
    fn default() -> Self {
        let KrxConfig {
            base_url,
            user_agent,
            requests_per_second,
        } = KrxConfig::default();
        Self {
            base_url,
            user_agent,
            requests_per_second,
        }
    }
}

impl From<&KrxSection> for KrxConfig {
    fn from(section: &KrxSection) -> Self {
        KrxConfig {
            base_url: section.base_url.clone(),
            user_agent: section.user_agent.clone(),
            requests_per_second: section.requests_per_second,
        }
    }
}

impl ScreenerConfig {
    /// Reads `path` when given, otherwise starts from defaults, then applies environment
    /// overrides. Not validated yet; callers apply their own overrides first.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(get_env_var_opt);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Applies overrides found through `lookup`, keyed by environment variable name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(DATA_DIR_ENV) {
            self.data_dir = dir.into();
        }
        if let Some(dir) = lookup(RESULTS_DIR_ENV) {
            self.results_dir = dir.into();
        }
        if let Some(url) = lookup(KRX_BASE_URL_ENV) {
            self.krx.base_url = url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(ConfigError::Invalid(format!(
                "window_size must be at least {MIN_WINDOW_SIZE}, got {}",
                self.window_size
            )));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.krx.requests_per_second == 0 {
            return Err(ConfigError::Invalid(
                "krx.requests_per_second must be at least 1".into(),
            ));
        }
        if self.markets.is_empty() {
            return Err(ConfigError::Invalid("markets must not be empty".into()));
        }
        Ok(())
    }

    pub fn prices_dir(&self) -> PathBuf {
        self.data_dir.join("prices")
    }

    pub fn listings_dir(&self) -> PathBuf {
        self.data_dir.join("list")
    }
}
