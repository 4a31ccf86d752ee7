//! Per-instrument price movement history.

use super::movement::{MovementSymbol, PriceMove, Thresholds};
use super::InstrumentKey;
use crate::config::HistoryConfig;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

/// A bounded FIFO of movement symbols. The oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryBuffer {
    entries: VecDeque<MovementSymbol>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. Capacity is at least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a symbol, evicting from the front past capacity.
    pub fn push(&mut self, symbol: MovementSymbol) {
        self.entries.push_back(symbol);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = MovementSymbol> + '_ {
        self.entries.iter().copied()
    }

    /// Display cells, oldest to newest, always `capacity` wide.
    ///
    /// Cells that hold no observation yet are `None` and lead the sequence.
    pub fn render(&self) -> Vec<Option<MovementSymbol>> {
        let padding = self.capacity - self.entries.len();
        std::iter::repeat_n(None, padding)
            .chain(self.entries.iter().copied().map(Some))
            .collect()
    }
}

#[derive(Debug, Clone)]
struct HistoryRecord {
    buffer: HistoryBuffer,
    last_move: Option<PriceMove>,
}

/// Movement histories for every instrument observed so far.
#[derive(Debug, Clone)]
pub struct HistoryRegistry {
    records: BTreeMap<InstrumentKey, HistoryRecord>,
    capacity: usize,
    enabled: bool,
    thresholds: Thresholds,
}

impl HistoryRegistry {
    /// Create an empty registry.
    pub fn new(capacity: usize, enabled: bool, thresholds: Thresholds) -> Self {
        Self {
            records: BTreeMap::new(),
            capacity: capacity.max(1),
            enabled,
            thresholds,
        }
    }

    /// Create a registry from the history settings.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(
            config.length,
            config.enabled,
            Thresholds::new(config.minor_threshold, config.major_threshold),
        )
    }

    /// Whether history tracking is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Capacity of every buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record the move of one instrument between two fresh snapshots.
    ///
    /// Nothing is pushed when history is disabled or there is no usable previous price (a
    /// zero price means the venue had not traded). The buffer is created on the first
    /// real comparison.
    pub fn record(
        &mut self,
        key: &InstrumentKey,
        previous: Option<Decimal>,
        current: Decimal,
    ) -> Option<MovementSymbol> {
        if !self.enabled {
            return None;
        }

        let Some(previous) = previous.filter(|price| !price.is_zero()) else {
            if let Some(record) = self.records.get_mut(key) {
                record.last_move = None;
            }
            return None;
        };

        let symbol = self.thresholds.classify(Some(previous), current);
        let capacity = self.capacity;
        let record = self
            .records
            .entry(key.clone())
            .or_insert_with(|| HistoryRecord {
                buffer: HistoryBuffer::new(capacity),
                last_move: None,
            });
        record.buffer.push(symbol);
        record.last_move = Some(PriceMove::between(previous, current));

        Some(symbol)
    }

    /// The buffer for an instrument, if one has been created.
    pub fn buffer(&self, key: &InstrumentKey) -> Option<&HistoryBuffer> {
        self.records.get(key).map(|record| &record.buffer)
    }

    /// The price move recorded for an instrument in the latest fresh cycle.
    pub fn last_move(&self, key: &InstrumentKey) -> Option<PriceMove> {
        if !self.enabled {
            return None;
        }
        self.records.get(key).and_then(|record| record.last_move)
    }

    /// Display cells for an instrument. Empty when history is disabled.
    pub fn render(&self, key: &InstrumentKey) -> Vec<Option<MovementSymbol>> {
        if !self.enabled {
            return Vec::new();
        }

        match self.records.get(key) {
            Some(record) => record.buffer.render(),
            None => vec![None; self.capacity],
        }
    }

    /// Number of instruments with a history.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if no history has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
