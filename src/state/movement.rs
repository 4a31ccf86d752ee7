//! Price movement classification.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Direction of a price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
}

/// Intensity of a directional price move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intensity {
    Major,
    Minor,
}

/// Discrete classification of a price move between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementSymbol {
    PositiveMajor,
    PositiveMinor,
    NegativeMajor,
    NegativeMinor,
    Neutral,
}

impl MovementSymbol {
    /// Combine a direction and an intensity.
    pub fn directional(direction: Direction, intensity: Intensity) -> Self {
        match (direction, intensity) {
            (Direction::Positive, Intensity::Major) => Self::PositiveMajor,
            (Direction::Positive, Intensity::Minor) => Self::PositiveMinor,
            (Direction::Negative, Intensity::Major) => Self::NegativeMajor,
            (Direction::Negative, Intensity::Minor) => Self::NegativeMinor,
        }
    }

    /// Direction of the move, `None` for neutral.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::PositiveMajor | Self::PositiveMinor => Some(Direction::Positive),
            Self::NegativeMajor | Self::NegativeMinor => Some(Direction::Negative),
            Self::Neutral => None,
        }
    }

    /// The same intensity in the opposite direction.
    pub fn negate(self) -> Self {
        match self {
            Self::PositiveMajor => Self::NegativeMajor,
            Self::PositiveMinor => Self::NegativeMinor,
            Self::NegativeMajor => Self::PositiveMajor,
            Self::NegativeMinor => Self::PositiveMinor,
            Self::Neutral => Self::Neutral,
        }
    }
}

/// Classifier thresholds, both absolute price deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Moves at or below this size are neutral.
    pub minor: Decimal,
    /// Directional moves above this size are major.
    pub major: Decimal,
}

impl Thresholds {
    /// Create thresholds.
    pub fn new(minor: Decimal, major: Decimal) -> Self {
        Self { minor, major }
    }

    /// Classify a move against these thresholds.
    pub fn classify(&self, previous: Option<Decimal>, current: Decimal) -> MovementSymbol {
        classify(previous, current, self.minor, self.major)
    }
}

/// A signed price change at display precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceMove {
    /// `current - previous`, after rounding both prices.
    pub delta: Decimal,
    /// Number of fractional digits the prices were rounded to.
    pub scale: u32,
}

impl PriceMove {
    /// Compute the move between two prices at display precision.
    pub fn between(previous: Decimal, current: Decimal) -> Self {
        let scale = price_scale(previous).max(price_scale(current));
        let delta = round_price(current, scale) - round_price(previous, scale);
        Self { delta, scale }
    }
}

/// Fractional digits a price is displayed with.
pub fn price_scale(price: Decimal) -> u32 {
    if price < Decimal::ONE { 4 } else { 2 }
}

/// Round half away from zero, as prices are displayed.
pub fn round_price(price: Decimal, scale: u32) -> Decimal {
    price.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Classify the move from `previous` to `current`.
///
/// The first observation of an instrument (`previous == None`) is neutral. Otherwise the
/// move is neutral when `|delta| <= minor_threshold`, and among directional moves it is
/// major when `|delta| > major_threshold`.
pub fn classify(
    previous: Option<Decimal>,
    current: Decimal,
    minor_threshold: Decimal,
    major_threshold: Decimal,
) -> MovementSymbol {
    let Some(previous) = previous else {
        return MovementSymbol::Neutral;
    };

    let delta = PriceMove::between(previous, current).delta;
    let size = delta.abs();

    if size <= minor_threshold {
        return MovementSymbol::Neutral;
    }

    let direction = if delta > Decimal::ZERO {
        Direction::Positive
    } else {
        Direction::Negative
    };
    let intensity = if size > major_threshold {
        Intensity::Major
    } else {
        Intensity::Minor
    };

    MovementSymbol::directional(direction, intensity)
}
