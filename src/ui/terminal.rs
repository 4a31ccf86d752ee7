//! Frame output on an ANSI terminal.

use crate::error::{Error, Result};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color as TermColor, Print, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use ratatui::{style::Modifier, text::Line};
use std::io::{self, Stdout, Write};

/// Writes whole frames to a terminal.
///
/// Each frame is assembled in memory and emitted with a single write, so a viewer never
/// sees a half-drawn table.
pub struct FrameWriter<W: Write> {
    writer: W,
    frames: u64,
}

impl FrameWriter<Stdout> {
    /// Create a frame writer on standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> FrameWriter<W> {
    /// Create a frame writer on any output.
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Clear the screen and draw a frame.
    pub fn draw(&mut self, lines: &[Line<'_>]) -> Result<()> {
        let mut buffer = Vec::with_capacity(4096);
        queue!(buffer, MoveTo(0, 0), Clear(ClearType::All))?;

        for line in lines {
            for span in &line.spans {
                let style = line.style.patch(span.style);
                let mut styled = false;

                if let Some(color) = style.fg {
                    queue!(buffer, SetForegroundColor(TermColor::from(color)))?;
                    styled = true;
                }
                if style.add_modifier.contains(Modifier::BOLD) {
                    queue!(buffer, SetAttribute(Attribute::Bold))?;
                    styled = true;
                }
                if style.add_modifier.contains(Modifier::ITALIC) {
                    queue!(buffer, SetAttribute(Attribute::Italic))?;
                    styled = true;
                }

                queue!(buffer, Print(span.content.as_ref()))?;

                if styled {
                    queue!(buffer, SetAttribute(Attribute::Reset))?;
                }
            }
            queue!(buffer, Print("\n"))?;
        }

        self.writer
            .write_all(&buffer)
            .and_then(|_| self.writer.flush())
            .map_err(|e| Error::terminal(format!("Failed to draw frame: {}", e)))?;
        self.frames += 1;
        Ok(())
    }

    /// Number of frames drawn.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{
        style::{Color, Style},
        text::Span,
    };

    fn output(writer: &FrameWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.writer().clone()).unwrap()
    }

    #[test]
    fn test_frame_starts_with_clear() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.draw(&[Line::raw("hello")]).unwrap();

        let out = output(&writer);
        assert!(out.starts_with("\x1b[1;1H\x1b[2J"));
        assert!(out.ends_with("hello\n"));
        assert_eq!(writer.frames(), 1);
    }

    #[test]
    fn test_styled_span_is_reset() {
        let mut writer = FrameWriter::new(Vec::new());
        let line = Line::from(vec![
            Span::styled("up", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" plain"),
        ]);
        writer.draw(&[line]).unwrap();

        let out = output(&writer);
        let bold = out.find("\x1b[1m").unwrap();
        let text = out.find("up").unwrap();
        let reset = out.find("\x1b[0m").unwrap();
        assert!(bold < text && text < reset);
        assert!(out.ends_with(" plain\n"));
    }

    #[test]
    fn test_foreground_color_is_written() {
        let mut writer = FrameWriter::new(Vec::new());
        let line = Line::from(Span::styled("down", Style::default().fg(Color::Red)));
        writer.draw(&[line]).unwrap();

        let out = output(&writer);
        let color = out.find("\x1b[38;5;1m").unwrap();
        assert!(color < out.find("down").unwrap());
    }
}
