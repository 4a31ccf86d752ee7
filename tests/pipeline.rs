//! End-to-end tests of the fetch, reduce, render cycle.

use chrono::{Duration, Utc};
use crypticker::config::Config;
use crypticker::state::{
    DegradedReason, FetchOutcome, HistoryRegistry, InstrumentKey, MovementSymbol, Quote,
    Snapshot, StatusLatch, StatusLine, Store, Thresholds,
};
use crypticker::ui::Ui;
use pretty_assertions::assert_eq;
use ratatui::style::Color;
use ratatui::text::Line;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn btc_usd() -> InstrumentKey {
    InstrumentKey::parse("BTC/USD").unwrap()
}

fn config() -> Config {
    let mut config = Config::default();
    config.markets = vec!["BTC/USD".to_string(), "ETH/USD".to_string()];
    config.history.length = 5;
    config.history.minor_threshold = dec!(0.5);
    config.history.major_threshold = dec!(5);
    config
}

fn store(config: &Config) -> Store {
    Store::new(
        config.tracked_instruments().unwrap(),
        HistoryRegistry::new(
            config.history.length,
            true,
            Thresholds::new(config.history.minor_threshold, config.history.major_threshold),
        ),
        StatusLine::new(config.app.near_limit_quota_threshold),
    )
}

fn fresh(btc: Decimal, eth: Decimal) -> FetchOutcome {
    let mut snapshot = Snapshot::new();
    snapshot.insert(btc_usd(), Quote::new(btc, Some(dec!(2.5)), "BTC"));
    snapshot.insert(
        InstrumentKey::parse("ETH/USD").unwrap(),
        Quote::new(eth, Some(dec!(-0.75)), "ETH"),
    );
    FetchOutcome::Ok(snapshot)
}

fn table(lines: &[Line<'_>]) -> Vec<String> {
    lines
        .iter()
        .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
        .collect()
}

#[test]
fn minor_rise_is_recorded_and_rendered() {
    let config = config();
    let mut store = store(&config);
    let now = Utc::now();

    store.reduce(fresh(dec!(100.00), dec!(2000)), now);
    store.reduce(fresh(dec!(101.00), dec!(2000)), now);

    let buffer = store.histories.buffer(&btc_usd()).unwrap();
    assert_eq!(
        buffer.iter().collect::<Vec<_>>(),
        vec![MovementSymbol::PositiveMinor]
    );

    let frame = Ui::render(&store, &config, now);
    let row = frame
        .iter()
        .find(|line| line.spans.iter().any(|s| s.content.contains("BTC")))
        .unwrap();

    let arrow = row
        .spans
        .iter()
        .find(|s| s.content == config.history.positive_minor_symbol)
        .unwrap();
    assert_eq!(arrow.style.fg, Some(Color::Green));
    assert!(row.spans.iter().any(|s| s.content == "+1.00"));
}

#[test]
fn consecutive_failures_keep_the_last_good_table() {
    let config = config();
    let mut store = store(&config);
    let t0 = Utc::now();

    store.reduce(fresh(dec!(100), dec!(2000)), t0);
    store.reduce(fresh(dec!(104), dec!(1990)), t0 + Duration::seconds(10));
    let good = table(&Ui::render(&store, &config, t0 + Duration::seconds(10)));
    let last_success = store.snapshots.last_success();

    let mut stale_tables = Vec::new();
    for cycle in 2..4 {
        let now = t0 + Duration::seconds(10 * cycle);
        store.reduce(FetchOutcome::TransientError("timed out".to_string()), now);

        assert_eq!(
            store.status.latch(),
            StatusLatch::Degraded(DegradedReason::FetchError)
        );
        assert_eq!(store.snapshots.last_success(), last_success);

        let frame = table(&Ui::render(&store, &config, now));
        stale_tables.push(frame[..frame.len() - 1].to_vec());
        assert!(frame.last().unwrap().contains("Unable to fetch market data"));
    }

    assert_eq!(stale_tables[0], good);
    assert_eq!(stale_tables[1], good);
}

#[test]
fn identical_snapshots_settle_to_neutral() {
    let config = config();
    let mut store = store(&config);
    let now = Utc::now();

    for _ in 0..8 {
        store.reduce(fresh(dec!(100), dec!(2000)), now);
    }

    for key in store.tracked() {
        let symbols: Vec<_> = store.histories.buffer(key).unwrap().iter().collect();
        assert_eq!(symbols, vec![MovementSymbol::Neutral; 5]);
    }
}

#[test]
fn history_keeps_the_most_recent_moves() {
    let config = config();
    let mut store = store(&config);
    let now = Utc::now();

    let prices = [
        dec!(100),
        dec!(110),
        dec!(109),
        dec!(109),
        dec!(100),
        dec!(101),
        dec!(101.2),
    ];
    for price in prices {
        store.reduce(fresh(price, dec!(2000)), now);
    }

    let rendered: Vec<_> = store.histories.render(&btc_usd());
    assert_eq!(
        rendered,
        vec![
            Some(MovementSymbol::NegativeMinor),
            Some(MovementSymbol::Neutral),
            Some(MovementSymbol::NegativeMajor),
            Some(MovementSymbol::PositiveMinor),
            Some(MovementSymbol::Neutral),
        ]
    );
}

#[test]
fn rate_limit_without_prior_success_shows_no_data() {
    let config = config();
    let mut store = store(&config);
    let now = Utc::now();

    store.reduce(FetchOutcome::RateLimited, now);

    let frame = table(&Ui::render(&store, &config, now));
    assert!(frame.iter().any(|line| line.contains("No data yet")));
    assert!(
        frame
            .last()
            .unwrap()
            .ends_with("API limit has been reached · no successful update yet")
    );
}

#[test]
fn recovery_clears_the_banner() {
    let config = config();
    let mut store = store(&config);
    let now = Utc::now();

    store.reduce(fresh(dec!(100), dec!(2000)), now);
    store.reduce(FetchOutcome::RateLimited, now);
    assert!(store.banner(now).is_some());

    store.reduce(fresh(dec!(100), dec!(2000)), now);
    assert!(store.banner(now).is_none());
    assert_eq!(store.status.latch(), StatusLatch::Normal);
}
