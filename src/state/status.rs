//! Fetch status latch driving the status banner.

use super::FetchOutcome;
use chrono::Duration;

/// Why the ticker is serving stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedReason {
    /// Network or parse failure.
    FetchError,
    /// Vendor quota exhausted.
    RateLimited,
}

/// Sticky part of the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusLatch {
    #[default]
    Normal,
    Degraded(DegradedReason),
}

/// A banner to display below the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    /// Quota is close to exhausted.
    NearLimit,
    /// The latest fetch failed.
    Degraded {
        reason: DegradedReason,
        /// Time since the last successful fetch, `None` if there never was one.
        age: Option<Duration>,
    },
}

/// Status derived from the latest fetch outcome.
#[derive(Debug, Clone)]
pub struct StatusLine {
    latch: StatusLatch,
    near_limit: bool,
    near_limit_threshold: u64,
}

impl StatusLine {
    /// Create a status line in the normal state.
    pub fn new(near_limit_threshold: u64) -> Self {
        Self {
            latch: StatusLatch::Normal,
            near_limit: false,
            near_limit_threshold,
        }
    }

    /// Advance the status with the latest outcome.
    pub fn observe(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Ok(snapshot) => {
                self.latch = StatusLatch::Normal;
                self.near_limit = snapshot
                    .remaining_quota()
                    .is_some_and(|remaining| remaining < self.near_limit_threshold);
            }
            FetchOutcome::NearLimit(_) => {
                self.latch = StatusLatch::Normal;
                self.near_limit = true;
            }
            FetchOutcome::TransientError(_) => {
                self.latch = StatusLatch::Degraded(DegradedReason::FetchError);
                self.near_limit = false;
            }
            FetchOutcome::RateLimited => {
                self.latch = StatusLatch::Degraded(DegradedReason::RateLimited);
                self.near_limit = false;
            }
        }
    }

    /// Current latch state.
    pub fn latch(&self) -> StatusLatch {
        self.latch
    }

    /// Whether the near-limit warning applies to this cycle.
    pub fn is_near_limit(&self) -> bool {
        self.near_limit
    }

    /// The banner for this cycle, given the age of the last good snapshot.
    pub fn banner(&self, age: Option<Duration>) -> Option<Banner> {
        match self.latch {
            StatusLatch::Degraded(reason) => Some(Banner::Degraded { reason, age }),
            StatusLatch::Normal if self.near_limit => Some(Banner::NearLimit),
            StatusLatch::Normal => None,
        }
    }
}
