//! Price table widget.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::config::{Config, HistoryConfig};
use crate::state::{ActiveSnapshot, HistoryRegistry, InstrumentKey, MovementSymbol, Quote, Snapshot};
use crate::ui::format::{format_move, format_percent, format_price};
use rust_decimal::Decimal;

/// Prefix of the primary currency label.
const PRIMARY_MARKER: &str = " › ";
/// Minimum width of the price column.
const MIN_PRICE_WIDTH: usize = 10;
/// Width of the percent-change column (`▼ 100.00%`).
const CHANGE_WIDTH: usize = 9;

/// Column widths for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub primary: usize,
    pub secondary: usize,
    pub exchange: Option<usize>,
    pub price: usize,
}

impl ColumnWidths {
    /// Measure the instruments present in a snapshot.
    pub fn measure(snapshot: &Snapshot) -> Self {
        let mut secondary = 0;
        let mut price = MIN_PRICE_WIDTH;
        for (key, quote) in snapshot.iter() {
            secondary = secondary.max(key.secondary.chars().count());
            price = price.max(format_price(quote.last_price).chars().count());
        }

        Self {
            primary: PRIMARY_MARKER.chars().count() + snapshot.longest_display_name(),
            secondary,
            exchange: snapshot
                .has_exchanges()
                .then(|| snapshot.longest_exchange_name()),
            price,
        }
    }
}

/// Price table widget.
pub struct PriceTable;

impl PriceTable {
    /// Render the table rows for the active snapshot.
    ///
    /// Group labels are printed on the first row of each primary / secondary group and
    /// replaced by blank padding of equal width afterwards. A blank line closes every
    /// secondary group.
    pub fn render(
        active: ActiveSnapshot<'_>,
        histories: &HistoryRegistry,
        config: &Config,
    ) -> Vec<Line<'static>> {
        let Some(snapshot) = active.snapshot() else {
            return vec![Self::no_data_line()];
        };

        let widths = ColumnWidths::measure(snapshot);
        let padding = " ".repeat(config.app.column_padding);
        let mut lines = Vec::with_capacity(snapshot.len() * 2);
        let mut previous: Option<InstrumentKey> = None;

        for (key, quote) in snapshot.iter() {
            let new_primary = previous.as_ref().is_none_or(|p| p.primary != key.primary);
            let new_secondary = new_primary
                || previous.as_ref().is_none_or(|p| p.secondary != key.secondary);

            if new_secondary && previous.is_some() {
                lines.push(Line::default());
            }

            let mut spans = Vec::with_capacity(12);

            if new_primary {
                spans.push(Span::styled(
                    format!(
                        "{:<width$}",
                        format!("{}{}", PRIMARY_MARKER, quote.display_name),
                        width = widths.primary
                    ),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ));
            } else {
                spans.push(Span::raw(" ".repeat(widths.primary)));
            }
            spans.push(Span::raw(padding.clone()));

            let secondary = if new_secondary { key.secondary.as_str() } else { "" };
            spans.push(Span::raw(format!(
                "{:<width$}{}",
                secondary,
                padding,
                width = widths.secondary
            )));

            if let Some(width) = widths.exchange {
                spans.push(Span::raw(format!(
                    "{:<width$}{}",
                    key.exchange.as_deref().unwrap_or(""),
                    padding,
                    width = width
                )));
            }

            spans.push(Span::raw(format!(
                "{:>width$} ",
                format_price(quote.last_price),
                width = widths.price
            )));

            spans.push(Self::change_span(&key, quote, config));

            if histories.is_enabled() {
                spans.push(Span::raw(" "));
                spans.extend(Self::history_spans(histories, &key, &config.history));
                if let Some(price_move) = histories.last_move(&key) {
                    spans.push(Span::raw(" "));
                    spans.push(Span::styled(
                        format_move(price_move),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }

            lines.push(Line::from(spans));
            previous = Some(key);
        }

        if previous.is_some() {
            lines.push(Line::default());
        }

        lines
    }

    /// The percent-change cell, blank when the figure is unavailable.
    fn change_span(key: &InstrumentKey, quote: &Quote, config: &Config) -> Span<'static> {
        let percent = quote
            .change_percent
            .filter(|_| config.app.change_supported(&key.secondary));

        let Some(percent) = percent else {
            return Span::raw(" ".repeat(CHANGE_WIDTH));
        };

        let text = format_percent(percent);
        if text == "0.00" {
            return Span::raw(format!("{:<width$}", "- 0.00%", width = CHANGE_WIDTH));
        }

        let (arrow, color) = if percent > Decimal::ZERO {
            ("▲", Color::Green)
        } else {
            ("▼", Color::Red)
        };
        Span::styled(
            format!("{:<width$}", format!("{} {}%", arrow, text), width = CHANGE_WIDTH),
            Style::default().fg(color),
        )
    }

    fn history_spans(
        histories: &HistoryRegistry,
        key: &InstrumentKey,
        config: &HistoryConfig,
    ) -> Vec<Span<'static>> {
        histories
            .render(key)
            .into_iter()
            .map(|cell| match cell {
                Some(symbol) => {
                    let (glyph, style) = history_glyph(symbol, config);
                    Span::styled(glyph.to_string(), style)
                }
                None => Span::raw(config.placeholder_symbol.clone()),
            })
            .collect()
    }

    fn no_data_line() -> Line<'static> {
        Line::from(Span::styled(
            " No data yet, waiting for the first market update",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ))
    }
}

/// The configured glyph and style of a movement symbol.
pub fn history_glyph(symbol: MovementSymbol, config: &HistoryConfig) -> (&str, Style) {
    let up = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);
    let down = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    match symbol {
        MovementSymbol::PositiveMajor => (config.positive_major_symbol.as_str(), up),
        MovementSymbol::PositiveMinor => (config.positive_minor_symbol.as_str(), up),
        MovementSymbol::NegativeMajor => (config.negative_major_symbol.as_str(), down),
        MovementSymbol::NegativeMinor => (config.negative_minor_symbol.as_str(), down),
        MovementSymbol::Neutral => (
            config.neutral_symbol.as_str(),
            Style::default().fg(Color::DarkGray),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FetchOutcome, StatusLine, Store, Thresholds};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn config(markets: &[&str]) -> Config {
        let mut config = Config::default();
        config.markets = markets.iter().map(|m| m.to_string()).collect();
        config.history.length = 3;
        config
    }

    fn snapshot(rows: &[(&str, Decimal, Option<Decimal>)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (spec, price, change) in rows {
            let key = InstrumentKey::parse(spec).unwrap();
            let name = key.primary.clone();
            snapshot.insert(key, Quote::new(*price, *change, name));
        }
        snapshot
    }

    fn store(config: &Config) -> Store {
        Store::new(
            config.tracked_instruments().unwrap(),
            HistoryRegistry::new(
                config.history.length,
                config.history.enabled,
                Thresholds::new(dec!(0.5), dec!(5)),
            ),
            StatusLine::new(0),
        )
    }

    #[test]
    fn test_no_data() {
        let config = config(&["BTC/USD"]);
        let lines = PriceTable::render(ActiveSnapshot::NoData, &store(&config).histories, &config);
        assert_eq!(lines.len(), 1);
        assert!(text(&lines[0]).contains("No data yet"));
    }

    #[test]
    fn test_repeated_primary_is_blank_padded() {
        let config = config(&["BTC/EUR", "BTC/USD"]);
        let snapshot = snapshot(&[
            ("BTC/USD", dec!(60000), Some(dec!(1))),
            ("BTC/EUR", dec!(55000), Some(dec!(1))),
        ]);

        let lines = PriceTable::render(
            ActiveSnapshot::Fresh(&snapshot),
            &store(&config).histories,
            &config,
        );

        // EUR row, separator, USD row, separator
        assert_eq!(lines.len(), 4);
        let first = &lines[0].spans[0];
        let second = &lines[2].spans[0];
        assert_eq!(first.content, " › BTC");
        assert_eq!(second.content, "      ");
        assert_eq!(
            first.content.chars().count(),
            second.content.chars().count()
        );
        assert!(text(&lines[0]).contains("EUR"));
        assert!(text(&lines[2]).contains("USD"));
    }

    #[test]
    fn test_columns_align_across_groups() {
        let mut config = config(&["kraken:btcusd", "bitstamp:btcusd", "kraken:ethusd"]);
        config.names.insert("ETH".to_string(), "Ethereum".to_string());
        let mut snapshot = snapshot(&[
            ("kraken:btcusd", dec!(60000), Some(dec!(2))),
            ("bitstamp:btcusd", dec!(60010.5), Some(dec!(-2))),
        ]);
        snapshot.insert(
            InstrumentKey::parse("kraken:ethusd").unwrap(),
            Quote::new(dec!(0.5), None, "Ethereum"),
        );

        let lines: Vec<String> = PriceTable::render(
            ActiveSnapshot::Fresh(&snapshot),
            &store(&config).histories,
            &config,
        )
        .iter()
        .map(text)
        .filter(|l| !l.is_empty())
        .collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" › BTC     "));
        assert!(lines[1].starts_with("           "));
        assert!(lines[2].starts_with(" › Ethereum"));

        let price_end = |line: &str, price: &str| line.find(price).unwrap() + price.len();
        assert_eq!(
            price_end(&lines[0], "60,010.50"),
            price_end(&lines[2], "0.5000")
        );
        assert!(lines[0].contains("Bitstamp"));
        assert!(lines[1].contains("Kraken"));
    }

    #[test]
    fn test_percent_change_cells() {
        let mut config = config(&["kraken:btcusd", "kraken:ethbtc", "kraken:ltcusd"]);
        config.app.unsupported_changes.push(crate::config::UnsupportedChange {
            secondary: "BTC".to_string(),
            timeframe: crate::config::ChangeTimeframe::Day,
        });
        let snapshot = snapshot(&[
            ("kraken:btcusd", dec!(60000), Some(dec!(-1.234))),
            ("kraken:ethbtc", dec!(0.05), Some(dec!(4))),
            ("kraken:ltcusd", dec!(80), Some(dec!(0.001))),
        ]);

        let lines = PriceTable::render(
            ActiveSnapshot::Fresh(&snapshot),
            &store(&config).histories,
            &config,
        );
        // label, padding, secondary, exchange, price, change
        let change_cell = |line: &Line<'static>| line.spans[5].clone();

        let btc = change_cell(&lines[0]);
        assert_eq!(btc.content, "▼ 1.23%  ");
        assert_eq!(btc.style.fg, Some(Color::Red));

        let eth = change_cell(&lines[2]);
        assert_eq!(eth.content, " ".repeat(CHANGE_WIDTH));

        let ltc = change_cell(&lines[4]);
        assert_eq!(ltc.content, "- 0.00%  ");
        assert_eq!(ltc.style.fg, None);
    }

    #[test]
    fn test_history_column_after_price_move() {
        let config = config(&["BTC/USD"]);
        let mut store = store(&config);
        let now = Utc::now();
        store.reduce(
            FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(100.00), Some(dec!(0.5)))])),
            now,
        );
        store.reduce(
            FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(101.00), Some(dec!(1.5)))])),
            now,
        );

        let lines = PriceTable::render(store.active(), &store.histories, &config);
        let spans = &lines[0].spans;

        let glyph = spans
            .iter()
            .find(|s| s.content == config.history.positive_minor_symbol)
            .unwrap();
        assert_eq!(glyph.style.fg, Some(Color::Green));

        let change = spans.last().unwrap();
        assert_eq!(change.content, "+1.00");
        assert_eq!(change.style.fg, Some(Color::DarkGray));

        let arrow = spans.iter().find(|s| s.content.starts_with('▲')).unwrap();
        assert_eq!(arrow.style.fg, Some(Color::Green));
    }

    #[test]
    fn test_first_frame_has_placeholders_and_no_move() {
        let config = config(&["BTC/USD"]);
        let mut store = store(&config);
        store.reduce(
            FetchOutcome::Ok(snapshot(&[("BTC/USD", dec!(100), None)])),
            Utc::now(),
        );

        let lines = PriceTable::render(store.active(), &store.histories, &config);
        let line = text(&lines[0]);
        assert!(line.ends_with(&format!(" {}", " ".repeat(3))));
        assert!(!line.contains('+'));
    }

    #[test]
    fn test_disabled_history_has_no_history_column() {
        let mut config = config(&["BTC/USD"]);
        config.history.enabled = false;
        let mut store = store(&config);
        let now = Utc::now();
        for price in [dec!(100), dec!(120)] {
            store.reduce(
                FetchOutcome::Ok(snapshot(&[("BTC/USD", price, Some(dec!(1)))])),
                now,
            );
        }

        let lines = PriceTable::render(store.active(), &store.histories, &config);
        let line = text(&lines[0]);
        assert!(line.trim_end().ends_with("▲ 1.00%"));
    }

    #[test]
    fn test_history_glyph_styles() {
        let config = HistoryConfig::default();
        let (glyph, style) = history_glyph(MovementSymbol::NegativeMajor, &config);
        assert_eq!(glyph, config.negative_major_symbol);
        assert_eq!(style.fg, Some(Color::Red));
        assert!(style.add_modifier.contains(Modifier::BOLD));

        let (_, style) = history_glyph(MovementSymbol::Neutral, &config);
        assert_eq!(style.fg, Some(Color::DarkGray));
    }
}
