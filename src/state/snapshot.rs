//! Normalized market snapshots.

use super::InstrumentKey;
use crate::error::Error;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Quotes for one (primary, secondary) pair, keyed by exchange.
pub type ExchangeQuotes = BTreeMap<Option<String>, Quote>;

/// A normalized quote for one instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Last traded price. Never negative.
    pub last_price: Decimal,
    /// Percent change over the configured timeframe, when the data source computes one.
    pub change_percent: Option<Decimal>,
    /// Label shown for the primary currency.
    pub display_name: String,
}

impl Quote {
    /// Create a new quote.
    pub fn new(last_price: Decimal, change_percent: Option<Decimal>, display_name: impl Into<String>) -> Self {
        Self {
            last_price: last_price.max(Decimal::ZERO),
            change_percent,
            display_name: display_name.into(),
        }
    }
}

/// The full set of current quotes from one fetch.
///
/// Quotes are nested primary -> secondary -> exchange in ordered maps, so iteration always
/// walks instruments in grouping order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    markets: BTreeMap<String, BTreeMap<String, ExchangeQuotes>>,
    longest_display_name: usize,
    longest_exchange_name: usize,
    remaining_quota: Option<u64>,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the remaining API quota reported alongside this snapshot.
    pub fn with_remaining_quota(mut self, remaining: u64) -> Self {
        self.remaining_quota = Some(remaining);
        self
    }

    /// Insert or replace the quote for an instrument.
    pub fn insert(&mut self, key: InstrumentKey, quote: Quote) {
        self.longest_display_name = self
            .longest_display_name
            .max(quote.display_name.chars().count());
        if let Some(exchange) = &key.exchange {
            self.longest_exchange_name = self.longest_exchange_name.max(exchange.chars().count());
        }

        self.markets
            .entry(key.primary)
            .or_default()
            .entry(key.secondary)
            .or_default()
            .insert(key.exchange, quote);
    }

    /// Get the quote for an instrument.
    pub fn get(&self, key: &InstrumentKey) -> Option<&Quote> {
        self.markets
            .get(&key.primary)?
            .get(&key.secondary)?
            .get(&key.exchange)
    }

    /// Check whether an instrument is present.
    pub fn contains(&self, key: &InstrumentKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterate instruments in sorted grouping order.
    pub fn iter(&self) -> impl Iterator<Item = (InstrumentKey, &Quote)> + '_ {
        self.markets.iter().flat_map(|(primary, secondaries)| {
            secondaries.iter().flat_map(move |(secondary, exchanges)| {
                exchanges.iter().map(move |(exchange, quote)| {
                    (
                        InstrumentKey {
                            primary: primary.clone(),
                            secondary: secondary.clone(),
                            exchange: exchange.clone(),
                        },
                        quote,
                    )
                })
            })
        })
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.markets
            .values()
            .flat_map(|secondaries| secondaries.values())
            .map(|exchanges| exchanges.len())
            .sum()
    }

    /// Check if the snapshot holds no quotes.
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Drop every instrument not in the tracked set and recompute layout metadata.
    pub fn retain_tracked(self, tracked: &BTreeSet<InstrumentKey>) -> Self {
        let remaining_quota = self.remaining_quota;
        let mut filtered = Snapshot {
            remaining_quota,
            ..Snapshot::default()
        };

        for (key, quote) in self.iter() {
            if tracked.contains(&key) {
                filtered.insert(key, quote.clone());
            }
        }

        filtered
    }

    /// Longest display name among present primary currencies.
    pub fn longest_display_name(&self) -> usize {
        self.longest_display_name
    }

    /// Longest exchange name among present exchanges.
    pub fn longest_exchange_name(&self) -> usize {
        self.longest_exchange_name
    }

    /// Whether any instrument in the snapshot carries an exchange.
    pub fn has_exchanges(&self) -> bool {
        self.longest_exchange_name > 0
    }

    /// Remaining API quota reported with this snapshot.
    pub fn remaining_quota(&self) -> Option<u64> {
        self.remaining_quota
    }
}

/// The result of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fresh data, quota healthy.
    Ok(Snapshot),
    /// Fresh data, but the vendor quota is close to exhausted.
    NearLimit(Snapshot),
    /// Network or parse failure.
    TransientError(String),
    /// Vendor quota exhausted.
    RateLimited,
}

impl FetchOutcome {
    /// The fetched snapshot, if the fetch succeeded.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Ok(snapshot) | Self::NearLimit(snapshot) => Some(snapshot),
            Self::TransientError(_) | Self::RateLimited => None,
        }
    }

    /// Check if the fetch produced data.
    pub fn is_success(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Transform the snapshot carried by a successful outcome.
    pub fn map_snapshot(self, f: impl FnOnce(Snapshot) -> Snapshot) -> Self {
        match self {
            Self::Ok(snapshot) => Self::Ok(f(snapshot)),
            Self::NearLimit(snapshot) => Self::NearLimit(f(snapshot)),
            other => other,
        }
    }
}

impl From<&Error> for FetchOutcome {
    fn from(err: &Error) -> Self {
        match err {
            Error::RateLimited => Self::RateLimited,
            other => Self::TransientError(other.to_string()),
        }
    }
}
