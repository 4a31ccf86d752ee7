//! Main application module.
//!
//! This module contains the main `App` struct that drives the polling loop: fetch,
//! reduce into the [`Store`], render and draw, once per interval.

use crate::api::{ApiClient, MarketSource};
use crate::config::Config;
use crate::error::Result;
use crate::state::Store;
use crate::ui::{FrameWriter, Ui};

use chrono::Utc;
use std::future::Future;
use std::io::{Stdout, Write};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// The main application.
pub struct App<S: MarketSource, W: Write> {
    /// Market data source.
    source: S,
    /// Ticker state.
    store: Store,
    /// Terminal output.
    frames: FrameWriter<W>,
    /// Configuration.
    config: Config,
}

impl App<ApiClient, Stdout> {
    /// Create the application polling the configured API and drawing to stdout.
    pub fn new(config: Config) -> Result<Self> {
        let source = ApiClient::new(&config)?;
        Self::with_source(config, source, FrameWriter::stdout())
    }
}

impl<S: MarketSource, W: Write> App<S, W> {
    /// Create the application with an explicit source and output.
    pub fn with_source(config: Config, source: S, frames: FrameWriter<W>) -> Result<Self> {
        let store = Store::from_config(&config)?;
        Ok(Self {
            source,
            store,
            frames,
            config,
        })
    }

    /// Run until Ctrl-C.
    pub async fn run(&mut self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run the polling loop until `shutdown` completes.
    ///
    /// The first cycle starts immediately. A cycle is never started while the previous
    /// one is still in flight; late ticks are delayed rather than bunched up.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let period = Duration::from_millis(self.config.app.poll_interval_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            markets = self.config.markets.len(),
            interval_ms = period.as_millis() as u64,
            history = self.config.history.enabled,
            "Starting ticker"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down after {} cycles", self.store.cycles());
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await?;
                }
            }
        }

        Ok(())
    }

    /// Run a single cycle: fetch, reduce, render, draw.
    pub async fn tick(&mut self) -> Result<()> {
        let outcome = self.source.fetch().await;
        let now = Utc::now();
        debug!(success = outcome.is_success(), "Fetch completed");

        self.store.reduce(outcome, now);
        let frame = Ui::render(&self.store, &self.config, now);
        self.frames.draw(&frame)
    }

    /// The ticker state.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The frame writer.
    pub fn frames(&self) -> &FrameWriter<W> {
        &self.frames
    }
}
