//! Market summaries response schema and conversion to snapshots.

use crate::config::{ChangeTimeframe, Config};
use crate::state::{FetchOutcome, InstrumentKey, Quote, Snapshot};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Response of `GET /markets/summaries`.
#[derive(Debug, Clone, Deserialize)]
pub struct SummariesResponse {
    /// Summaries keyed `exchange:pair`, decoded lazily per tracked market.
    pub result: BTreeMap<String, Value>,
    /// Remaining request allowance.
    #[serde(default)]
    pub allowance: Option<Allowance>,
}

/// Summary of one market.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketSummary {
    pub price: PriceSummary,
}

/// Price section of a market summary.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceSummary {
    pub last: Decimal,
    pub change: PriceChange,
}

/// 24 hour price change.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceChange {
    /// Fractional change (`0.0123` is 1.23%).
    pub percentage: Decimal,
}

/// API request allowance.
#[derive(Debug, Clone, Deserialize)]
pub struct Allowance {
    /// Cost of the request that returned this allowance.
    #[serde(default)]
    pub cost: Option<u64>,
    pub remaining: u64,
}

/// Converts market summaries into normalized snapshots.
#[derive(Debug, Clone)]
pub struct DataConverter {
    tracked: Vec<InstrumentKey>,
    timeframe: ChangeTimeframe,
    names: BTreeMap<String, String>,
    near_limit_threshold: u64,
}

impl DataConverter {
    /// Create a converter for the configured markets.
    pub fn new(config: &Config) -> crate::Result<Self> {
        let tracked = config.tracked_instruments()?;
        let names = tracked
            .iter()
            .map(|key| (key.primary.clone(), config.display_name(&key.primary)))
            .collect();

        Ok(Self {
            tracked,
            timeframe: config.app.change_timeframe,
            names,
            near_limit_threshold: config.app.near_limit_quota_threshold,
        })
    }

    /// Convert a summaries response into a fetch outcome.
    ///
    /// Only tracked markets are decoded and kept; an entry that fails to decode is skipped.
    /// A tracked key without an exchange takes the pair from the alphabetically first
    /// exchange that lists it.
    pub fn convert(&self, response: SummariesResponse) -> FetchOutcome {
        let mut snapshot = Snapshot::new();

        for (market, value) in &response.result {
            let Some((exchange, pair)) = market.split_once(':') else {
                debug!("Skipping malformed market id {}", market);
                continue;
            };

            let keys: Vec<&InstrumentKey> = self
                .tracked
                .iter()
                .filter(|key| key.matches_market(exchange, pair) && !snapshot.contains(key))
                .collect();
            if keys.is_empty() {
                continue;
            }

            let summary = match MarketSummary::deserialize(value) {
                Ok(summary) => summary,
                Err(e) => {
                    debug!("Skipping market {} with unreadable summary: {}", market, e);
                    continue;
                }
            };

            for key in keys {
                snapshot.insert(key.clone(), self.convert_quote(key, &summary));
            }
        }

        match response.allowance {
            Some(allowance) => {
                let snapshot = snapshot.with_remaining_quota(allowance.remaining);
                if allowance.remaining < self.near_limit_threshold {
                    FetchOutcome::NearLimit(snapshot)
                } else {
                    FetchOutcome::Ok(snapshot)
                }
            }
            None => FetchOutcome::Ok(snapshot),
        }
    }

    fn convert_quote(&self, key: &InstrumentKey, summary: &MarketSummary) -> Quote {
        let change_percent = match self.timeframe {
            ChangeTimeframe::Day => Some(summary.price.change.percentage * Decimal::ONE_HUNDRED),
            // The summaries endpoint only reports 24 hour changes.
            ChangeTimeframe::Hour => None,
        };
        let display_name = self
            .names
            .get(&key.primary)
            .cloned()
            .unwrap_or_else(|| key.primary.clone());

        Quote::new(summary.price.last, change_percent, display_name)
    }
}
