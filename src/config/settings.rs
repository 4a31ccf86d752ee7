//! Configuration settings for crypticker.

use crate::error::{Error, Result};
use crate::state::InstrumentKey;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment variable overrides (`CRYPTICKER__APP__POLL_INTERVAL_MS`).
const ENV_PREFIX: &str = "CRYPTICKER";

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tracked markets (`exchange:pair`, `exchange:BASE/QUOTE` or `BASE/QUOTE`).
    pub markets: Vec<String>,
    /// Application configuration.
    pub app: AppConfig,
    /// API configuration.
    pub api: ApiConfig,
    /// Price history configuration.
    pub history: HistoryConfig,
    /// Display names for primary currencies (`BTC = "Bitcoin"`).
    pub names: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            markets: vec![
                "bitstamp:btcusd".to_string(),
                "kraken:btcusd".to_string(),
                "kraken:btceur".to_string(),
                "kraken:ethusd".to_string(),
                "kraken:ethbtc".to_string(),
            ],
            app: AppConfig::default(),
            api: ApiConfig::default(),
            history: HistoryConfig::default(),
            names: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration, creating the file from defaults if it does not exist yet.
    pub fn load_or_bootstrap(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        if !config_path.exists() {
            info!("Writing default configuration to {}", config_path.display());
            Self::default().save(Some(config_path.clone()))?;
        }

        Self::load(Some(config_path))
    }

    /// Load configuration from file, layered over the defaults and under environment
    /// variable overrides.
    ///
    /// The result is not validated; callers validate once command line flags are applied.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);
        Self::load_from(&config_path, Self::environment())
    }

    fn load_from(config_path: &Path, environment: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(
                config::File::from(config_path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(environment)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Environment overrides: `CRYPTICKER__SECTION__KEY`, `CRYPTICKER__MARKETS=a,b`.
    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("markets")
            .try_parsing(true)
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Check the configuration for values the ticker cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.app.poll_interval_ms == 0 {
            return Err(Error::config("app.poll_interval_ms must be greater than zero"));
        }
        if self.history.length == 0 {
            return Err(Error::config("history.length must be at least 1"));
        }
        if self.history.minor_threshold.is_sign_negative()
            || self.history.major_threshold.is_sign_negative()
        {
            return Err(Error::config("history thresholds must not be negative"));
        }
        if self.markets.is_empty() {
            return Err(Error::config("at least one market must be tracked"));
        }
        self.tracked_instruments()?;
        Ok(())
    }

    /// Parse the tracked markets into instrument keys.
    pub fn tracked_instruments(&self) -> Result<Vec<InstrumentKey>> {
        self.markets.iter().map(|m| InstrumentKey::parse(m)).collect()
    }

    /// The label shown for a primary currency.
    pub fn display_name(&self, code: &str) -> String {
        self.names
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(code))
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| code.to_uppercase())
    }
}

fn default_config_path() -> PathBuf {
    super::config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}

/// Timeframe of the percent-change column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTimeframe {
    Hour,
    #[default]
    Day,
}

impl std::fmt::Display for ChangeTimeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hour => write!(f, "1h"),
            Self::Day => write!(f, "24h"),
        }
    }
}

/// A secondary currency / timeframe combination without a server-computed change figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedChange {
    /// Secondary (quote) currency code.
    pub secondary: String,
    /// Timeframe the figure is missing for.
    pub timeframe: ChangeTimeframe,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Polling interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Spaces between table columns.
    pub column_padding: usize,
    /// Percent-change field to display.
    pub change_timeframe: ChangeTimeframe,
    /// Combinations whose percent change is blanked.
    pub unsupported_changes: Vec<UnsupportedChange>,
    /// Remaining API quota below which a warning is shown.
    pub near_limit_quota_threshold: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            column_padding: 2,
            change_timeframe: ChangeTimeframe::Day,
            unsupported_changes: Vec::new(),
            near_limit_quota_threshold: 100_000_000,
        }
    }
}

impl AppConfig {
    /// Check whether the percent change is shown for a secondary currency.
    pub fn change_supported(&self, secondary: &str) -> bool {
        !self.unsupported_changes.iter().any(|u| {
            u.timeframe == self.change_timeframe && u.secondary.eq_ignore_ascii_case(secondary)
        })
    }
}

/// Market data API configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.cryptowat.ch".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Price history configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Track and display price history.
    pub enabled: bool,
    /// Number of movements kept per instrument.
    pub length: usize,
    /// Moves at or below this absolute delta are neutral.
    pub minor_threshold: Decimal,
    /// Moves above this absolute delta use the major symbols.
    pub major_threshold: Decimal,
    /// Glyph for a large rise.
    pub positive_major_symbol: String,
    /// Glyph for a small rise.
    pub positive_minor_symbol: String,
    /// Glyph for a large fall.
    pub negative_major_symbol: String,
    /// Glyph for a small fall.
    pub negative_minor_symbol: String,
    /// Glyph for no significant move.
    pub neutral_symbol: String,
    /// Glyph for cells without an observation yet.
    pub placeholder_symbol: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            length: 20,
            minor_threshold: dec!(0.01),
            major_threshold: dec!(10),
            positive_major_symbol: "▲".to_string(),
            positive_minor_symbol: "△".to_string(),
            negative_major_symbol: "▼".to_string(),
            negative_minor_symbol: "▽".to_string(),
            neutral_symbol: "·".to_string(),
            placeholder_symbol: " ".to_string(),
        }
    }
}
