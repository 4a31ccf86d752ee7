//! Frame rendering.
//!
//! A frame is a list of styled [`Line`]s built from the [`Store`] and written to the
//! terminal by a [`FrameWriter`].

pub mod format;
mod terminal;
mod widgets;

pub use terminal::FrameWriter;
pub use widgets::{ColumnWidths, PriceTable, StatusBar, history_glyph};

use crate::config::Config;
use crate::state::Store;
use chrono::{DateTime, Utc};
use ratatui::text::Line;

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the full frame for the latest cycle.
    pub fn render(store: &Store, config: &Config, now: DateTime<Utc>) -> Vec<Line<'static>> {
        let mut lines = vec![Line::default()];
        lines.extend(PriceTable::render(store.active(), &store.histories, config));

        if let Some(banner) = StatusBar::render(store.banner(now)) {
            lines.push(banner);
        }

        lines
    }
}
