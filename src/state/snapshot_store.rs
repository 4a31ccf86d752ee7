//! Last-good snapshot storage.

use super::{FetchOutcome, Snapshot};
use chrono::{DateTime, Duration, Utc};

/// The snapshot a render cycle should display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveSnapshot<'a> {
    /// Data from the fetch that just completed.
    Fresh(&'a Snapshot),
    /// The last good snapshot, served because the latest fetch failed.
    Stale(&'a Snapshot),
    /// No fetch has ever succeeded.
    NoData,
}

impl<'a> ActiveSnapshot<'a> {
    /// The snapshot to render, if any.
    pub fn snapshot(&self) -> Option<&'a Snapshot> {
        match self {
            Self::Fresh(snapshot) | Self::Stale(snapshot) => Some(snapshot),
            Self::NoData => None,
        }
    }

    /// Check if this is stale data.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

/// Holds the last successfully fetched snapshot.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Option<Snapshot>,
    last_success: Option<DateTime<Utc>>,
    stale: bool,
}

impl SnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a fetch outcome.
    ///
    /// Successful outcomes replace the stored snapshot wholesale; failures leave it untouched
    /// and the previous snapshot is served as stale.
    pub fn update(&mut self, outcome: FetchOutcome, now: DateTime<Utc>) -> ActiveSnapshot<'_> {
        match outcome {
            FetchOutcome::Ok(snapshot) | FetchOutcome::NearLimit(snapshot) => {
                self.current = Some(snapshot);
                self.last_success = Some(now);
                self.stale = false;
            }
            FetchOutcome::TransientError(_) | FetchOutcome::RateLimited => {
                self.stale = true;
            }
        }

        self.active()
    }

    /// The snapshot to render for the latest cycle.
    pub fn active(&self) -> ActiveSnapshot<'_> {
        match &self.current {
            Some(snapshot) if self.stale => ActiveSnapshot::Stale(snapshot),
            Some(snapshot) => ActiveSnapshot::Fresh(snapshot),
            None => ActiveSnapshot::NoData,
        }
    }

    /// The stored snapshot.
    pub fn current(&self) -> Option<&Snapshot> {
        self.current.as_ref()
    }

    /// When the last successful fetch completed.
    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    /// Time elapsed since the last successful fetch.
    pub fn age_since_last_success(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_success
            .map(|at| (now - at).max(Duration::zero()))
    }
}
