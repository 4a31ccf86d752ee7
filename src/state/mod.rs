//! State management for crypticker.
//!
//! All mutable ticker state lives in a single [`Store`] owned by the polling driver and
//! advanced once per cycle with [`Store::reduce`]. Rendering only ever reads from it.

mod history;
mod instrument;
mod movement;
mod snapshot;
mod snapshot_store;
mod status;

pub use history::{HistoryBuffer, HistoryRegistry};
pub use instrument::{InstrumentKey, title_case};
pub use movement::{
    Direction, Intensity, MovementSymbol, PriceMove, Thresholds, classify, price_scale,
    round_price,
};
pub use snapshot::{ExchangeQuotes, FetchOutcome, Quote, Snapshot};
pub use snapshot_store::{ActiveSnapshot, SnapshotStore};
pub use status::{Banner, DegradedReason, StatusLatch, StatusLine};

use crate::config::Config;
use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use tracing::debug;

/// The ticker state store.
#[derive(Debug)]
pub struct Store {
    /// Last good snapshot.
    pub snapshots: SnapshotStore,
    /// Movement histories.
    pub histories: HistoryRegistry,
    /// Fetch status.
    pub status: StatusLine,
    /// Instruments that may be classified and rendered.
    tracked: BTreeSet<InstrumentKey>,
    /// Completed cycles.
    cycles: u64,
}

impl Store {
    /// Create a new store.
    pub fn new(
        tracked: impl IntoIterator<Item = InstrumentKey>,
        histories: HistoryRegistry,
        status: StatusLine,
    ) -> Self {
        Self {
            snapshots: SnapshotStore::new(),
            histories,
            status,
            tracked: tracked.into_iter().collect(),
            cycles: 0,
        }
    }

    /// Create a store from the application configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.tracked_instruments()?,
            HistoryRegistry::from_config(&config.history),
            StatusLine::new(config.app.near_limit_quota_threshold),
        ))
    }

    /// Apply the outcome of one fetch.
    ///
    /// Fresh snapshots are first narrowed to the tracked instruments, then every instrument
    /// is compared against the previously stored snapshot before that snapshot is replaced.
    /// Failed fetches only move the status latch.
    pub fn reduce(&mut self, outcome: FetchOutcome, now: DateTime<Utc>) {
        self.status.observe(&outcome);

        let outcome = outcome.map_snapshot(|snapshot| snapshot.retain_tracked(&self.tracked));

        if let Some(next) = outcome.snapshot() {
            let previous = self.snapshots.current();
            for (key, quote) in next.iter() {
                let previous_price = previous
                    .and_then(|snapshot| snapshot.get(&key))
                    .map(|quote| quote.last_price);
                if let Some(symbol) = self.histories.record(&key, previous_price, quote.last_price)
                {
                    debug!(instrument = %key, ?symbol, "Recorded price movement");
                }
            }
        }

        self.snapshots.update(outcome, now);
        self.cycles += 1;
    }

    /// The snapshot to render for the latest cycle.
    pub fn active(&self) -> ActiveSnapshot<'_> {
        self.snapshots.active()
    }

    /// The status banner for the latest cycle.
    pub fn banner(&self, now: DateTime<Utc>) -> Option<Banner> {
        self.status
            .banner(self.snapshots.age_since_last_success(now))
    }

    /// Tracked instruments in sorted order.
    pub fn tracked(&self) -> impl Iterator<Item = &InstrumentKey> {
        self.tracked.iter()
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn key(spec: &str) -> InstrumentKey {
        InstrumentKey::parse(spec).unwrap()
    }

    fn store(tracked: &[&str]) -> Store {
        Store::new(
            tracked.iter().map(|s| key(s)),
            HistoryRegistry::new(4, true, Thresholds::new(dec!(0.5), dec!(5))),
            StatusLine::new(1_000),
        )
    }

    fn snapshot(prices: &[(&str, Decimal)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (spec, price) in prices {
            let key = key(spec);
            let name = key.primary.clone();
            snapshot.insert(key, Quote::new(*price, Some(dec!(0)), name));
        }
        snapshot
    }

    #[test]
    fn test_untracked_instruments_are_dropped() {
        let mut store = store(&["BTC/USD"]);
        let now = Utc::now();
        store.reduce(
            FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(100)), ("ETH/USD", dec!(10))])),
            now,
        );
        store.reduce(
            FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(101)), ("ETH/USD", dec!(20))])),
            now,
        );

        let active = store.active().snapshot().unwrap();
        assert_eq!(active.len(), 1);
        assert!(store.histories.buffer(&key("ETH/USD")).is_none());
        assert_eq!(
            store.histories.render(&key("BTC/USD")),
            vec![None, None, None, Some(MovementSymbol::PositiveMinor)]
        );
    }

    #[test]
    fn test_identical_snapshots_are_neutral_after_first() {
        let mut store = store(&["BTC/USD", "ETH/USD"]);
        let now = Utc::now();
        let prices = [("BTC/USD", dec!(100)), ("ETH/USD", dec!(0.25))];

        for _ in 0..6 {
            store.reduce(FetchOutcome::Ok(snapshot(&prices)), now);
        }

        for spec in ["BTC/USD", "ETH/USD"] {
            let buffer = store.histories.buffer(&key(spec)).unwrap();
            assert_eq!(buffer.len(), 4);
            assert!(buffer.iter().all(|s| s == MovementSymbol::Neutral));
        }
        assert_eq!(store.cycles(), 6);
    }

    #[test]
    fn test_failures_do_not_touch_histories() {
        let mut store = store(&["BTC/USD"]);
        let now = Utc::now();
        store.reduce(FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(100))])), now);
        store.reduce(FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(110))])), now);
        let before = store.histories.buffer(&key("BTC/USD")).cloned();

        store.reduce(FetchOutcome::TransientError("timeout".into()), now);
        store.reduce(FetchOutcome::RateLimited, now);

        assert_eq!(store.histories.buffer(&key("BTC/USD")).cloned(), before);
        assert!(store.active().is_stale());
        assert_eq!(
            store.status.latch(),
            StatusLatch::Degraded(DegradedReason::RateLimited)
        );
    }

    #[test]
    fn test_comparison_after_failure_uses_last_good_snapshot() {
        let mut store = store(&["BTC/USD"]);
        let now = Utc::now();
        store.reduce(FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(100))])), now);
        store.reduce(FetchOutcome::RateLimited, now);
        store.reduce(FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(90))])), now);

        assert_eq!(
            store.histories.render(&key("BTC/USD")).last().copied().flatten(),
            Some(MovementSymbol::NegativeMajor)
        );
    }
}
