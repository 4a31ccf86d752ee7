//! Ticker widgets.

mod price_table;
mod status_bar;

pub use price_table::{ColumnWidths, PriceTable, history_glyph};
pub use status_bar::StatusBar;
