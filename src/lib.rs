//! # Crypticker - Terminal Cryptocurrency Ticker
//!
//! Polls a market summaries API on a fixed interval and redraws a table of the tracked
//! instruments with their last price, percent change and a short history of price
//! movements.
//!
//! ## Architecture
//!
//! - **App**: Polling loop and lifecycle
//! - **API**: Market summaries client, the only place vendor JSON is seen
//! - **State**: Snapshots, movement histories and fetch status in a single store
//! - **UI**: Table and status line rendering, frame output
//! - **Config**: Layered configuration and command line flags

pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod state;
pub mod ui;

pub use app::App;
pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
