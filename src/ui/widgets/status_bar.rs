//! Status bar widget.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::state::{Banner, DegradedReason};
use crate::ui::format::format_age;

/// Status bar widget.
pub struct StatusBar;

impl StatusBar {
    /// Render the banner line, if there is one.
    pub fn render(banner: Option<Banner>) -> Option<Line<'static>> {
        let line = match banner? {
            Banner::NearLimit => Line::from(Span::styled(
                " ⚠ API limit is close to being reached",
                Style::default().fg(Color::Yellow),
            )),
            Banner::Degraded { reason, age } => {
                let message = match reason {
                    DegradedReason::RateLimited => " ⚠ API limit has been reached",
                    DegradedReason::FetchError => " ⚠ Unable to fetch market data",
                };
                let freshness = match age {
                    Some(age) => format!(" · last updated {} ago", format_age(age)),
                    None => " · no successful update yet".to_string(),
                };

                Line::from(vec![
                    Span::styled(
                        message,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(freshness, Style::default().fg(Color::DarkGray)),
                ])
            }
        };

        Some(line)
    }
}
