//! Market data API integration.
//!
//! The rest of the application only sees [`FetchOutcome`]s produced by a [`MarketSource`];
//! vendor JSON never leaves this module.

mod client;
mod converter;

pub use client::{ApiClient, ApiClientBuilder};
pub use converter::{Allowance, DataConverter, MarketSummary, PriceChange, PriceSummary, SummariesResponse};

use crate::state::FetchOutcome;
use async_trait::async_trait;

/// A source of market snapshots, polled once per cycle.
///
/// Implementations absorb their own failures into the returned outcome.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch the latest snapshot.
    async fn fetch(&self) -> FetchOutcome;
}
