//! Instrument keys.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A tracked (primary currency, secondary currency, optional exchange) combination.
///
/// Currency codes are stored uppercase and exchange names in title case, so two keys built
/// from differently cased input compare equal. The derived ordering (primary, then secondary,
/// then exchange) is the grouping order of the rendered table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrumentKey {
    /// Base currency code (e.g. `BTC`).
    pub primary: String,
    /// Quote currency code (e.g. `USD`).
    pub secondary: String,
    /// Trading venue, when the same pair is tracked on several exchanges.
    pub exchange: Option<String>,
}

impl InstrumentKey {
    /// Create a new key, normalizing case.
    pub fn new(primary: &str, secondary: &str, exchange: Option<&str>) -> Self {
        Self {
            primary: primary.trim().to_uppercase(),
            secondary: secondary.trim().to_uppercase(),
            exchange: exchange.map(|e| title_case(e.trim())),
        }
    }

    /// Parse a market specification.
    ///
    /// Accepted forms are `exchange:btcusd` (a six letter pair split 3/3),
    /// `exchange:BTC/USD` and `BTC/USD`.
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(Error::invalid_market(spec, "empty market"));
        }

        let (exchange, pair) = match spec.split_once(':') {
            Some((exchange, pair)) => {
                if exchange.trim().is_empty() {
                    return Err(Error::invalid_market(spec, "missing exchange before ':'"));
                }
                (Some(exchange), pair)
            }
            None => (None, spec),
        };

        let (primary, secondary) = match pair.split_once('/') {
            Some((primary, secondary)) => (primary.trim(), secondary.trim()),
            None if exchange.is_some() && pair.len() == 6 && pair.is_ascii() => pair.split_at(3),
            None => {
                return Err(Error::invalid_market(
                    spec,
                    "expected BASE/QUOTE or a six letter exchange pair",
                ));
            }
        };

        for code in [primary, secondary] {
            if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(Error::invalid_market(
                    spec,
                    format!("invalid currency code '{}'", code),
                ));
            }
        }

        Ok(Self::new(primary, secondary, exchange))
    }

    /// The concatenated lowercase pair as the market data API names it (`btcusd`).
    pub fn pair(&self) -> String {
        format!("{}{}", self.primary, self.secondary).to_lowercase()
    }

    /// Check whether a vendor market (`exchange`, `pair`) refers to this instrument.
    ///
    /// A key without an exchange matches the pair on any venue.
    pub fn matches_market(&self, exchange: &str, pair: &str) -> bool {
        let exchange_matches = self
            .exchange
            .as_deref()
            .is_none_or(|e| e.eq_ignore_ascii_case(exchange));

        exchange_matches && self.pair().eq_ignore_ascii_case(pair)
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exchange {
            Some(exchange) => write!(f, "{}:{}/{}", exchange, self.primary, self.secondary),
            None => write!(f, "{}/{}", self.primary, self.secondary),
        }
    }
}

impl FromStr for InstrumentKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Title-case every word (`coinbase pro` -> `Coinbase Pro`).
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
