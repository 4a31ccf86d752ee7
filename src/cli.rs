//! Command line flags.

use crate::config::Config;
use clap::Parser;
use std::path::PathBuf;

/// Terminal ticker for cryptocurrency market summaries.
#[derive(Debug, Default, Parser)]
#[command(name = "crypticker", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "CRYPTICKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show price history
    #[arg(long)]
    pub history: bool,

    /// Hide price history
    #[arg(long = "no-history", alias = "nohistory")]
    pub no_history: bool,

    /// Polling interval in milliseconds
    #[arg(short, long, allow_negative_numbers = true)]
    pub interval: Option<i64>,

    /// Comma separated markets to track (e.g. kraken:btcusd,kraken:ethusd)
    #[arg(short, long, value_delimiter = ',')]
    pub markets: Option<Vec<String>>,
}

impl Cli {
    /// Apply the flags over a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if self.history {
            config.history.enabled = true;
        }
        if self.no_history {
            config.history.enabled = false;
        }

        if let Some(interval) = self.interval.filter(|ms| *ms > 0) {
            config.app.poll_interval_ms = interval as u64;
        }

        if let Some(markets) = &self.markets {
            let markets: Vec<String> = markets
                .iter()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect();
            if !markets.is_empty() {
                config.markets = markets;
            }
        }
    }
}
