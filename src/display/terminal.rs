//! Character-grid display rendered to any writer.
//!
//! The grid matches a 128x64 monochrome panel driven with a 6x8 font:
//! 21 columns by 8 rows. Heart rate goes top-left, elapsed time bottom-right.

use crate::core::{format_bpm, format_elapsed, RenderCommand};
use crate::display::{DisplayError, DisplaySink};
use std::io::Write;

pub const COLUMNS: usize = 21;
pub const ROWS: usize = 8;

/// A text display that writes the whole grid on every flush.
pub struct TerminalDisplay<W: Write> {
    out: W,
    grid: [[u8; COLUMNS]; ROWS],
    dirty: bool,
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            grid: [[b' '; COLUMNS]; ROWS],
            dirty: false,
        }
    }

    fn clear_grid(&mut self) {
        self.grid = [[b' '; COLUMNS]; ROWS];
    }

    /// Write ASCII text at a position, truncating at the right edge.
    fn put(&mut self, row: usize, col: usize, text: &str) {
        if row >= ROWS {
            return;
        }
        let cells = &mut self.grid[row][col.min(COLUMNS)..];
        for (cell, ch) in cells.iter_mut().zip(text.chars()) {
            *cell = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                b'?'
            };
        }
    }

    /// Current contents of a row, trailing spaces included.
    pub fn row(&self, row: usize) -> Option<String> {
        self.grid
            .get(row)
            .map(|cells| String::from_utf8_lossy(cells).into_owned())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for TerminalDisplay<W> {
    fn draw(&mut self, command: &RenderCommand) -> Result<(), DisplayError> {
        self.clear_grid();
        let (columns, rows) = self.dimensions();
        let (columns, rows) = (usize::from(columns), usize::from(rows));
        match command {
            RenderCommand::ShowReading {
                bpm,
                elapsed_seconds,
            } => {
                self.put(1, 1, &format!("{} bpm", format_bpm(*bpm)));
                let elapsed = format_elapsed(*elapsed_seconds);
                self.put(rows - 1, columns.saturating_sub(elapsed.len()), &elapsed);
            }
            RenderCommand::ShowText { text } => {
                let chars: Vec<char> = text.chars().collect();
                for (row, chunk) in chars.chunks(columns).take(rows).enumerate() {
                    let line: String = chunk.iter().collect();
                    self.put(row, 0, &line);
                }
            }
            RenderCommand::Clear => {}
        }
        self.dirty = true;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.dirty {
            return Ok(());
        }
        let border = format!("+{}+", "-".repeat(COLUMNS));
        writeln!(self.out, "{border}")?;
        for row in &self.grid {
            writeln!(self.out, "|{}|", String::from_utf8_lossy(row))?;
        }
        writeln!(self.out, "{border}")?;
        self.out.flush()?;
        self.dirty = false;
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (COLUMNS as u8, ROWS as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_layout() {
        let mut display = TerminalDisplay::new(Vec::new());
        display
            .draw(&RenderCommand::ShowReading {
                bpm: 72,
                elapsed_seconds: 130,
            })
            .unwrap();

        assert_eq!(display.row(1).unwrap().trim_end(), " 072 bpm");
        assert_eq!(display.row(7).unwrap(), format!("{:>21}", "02:10"));
    }

    #[test]
    fn test_text_wraps() {
        let mut display = TerminalDisplay::new(Vec::new());
        display
            .draw(&RenderCommand::text("abcdefghijklmnopqrstuvwxyz"))
            .unwrap();

        assert_eq!(display.row(0).unwrap(), "abcdefghijklmnopqrstu");
        assert_eq!(display.row(1).unwrap().trim_end(), "vwxyz");
    }

    #[test]
    fn test_clear_blanks_grid() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.draw(&RenderCommand::text("connected: true")).unwrap();
        display.draw(&RenderCommand::Clear).unwrap();

        for row in 0..ROWS {
            assert!(display.row(row).unwrap().trim().is_empty());
        }
    }

    #[test]
    fn test_flush_writes_frame_once() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.draw(&RenderCommand::text("hi")).unwrap();
        display.flush().unwrap();
        display.flush().unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out.lines().count(), ROWS + 2);
        assert!(out.contains("|hi                   |"));
    }

    #[test]
    fn test_row_out_of_range() {
        let display = TerminalDisplay::new(Vec::new());
        assert_eq!(display.dimensions(), (21, 8));
        assert!(display.row(ROWS - 1).is_some());
        assert_eq!(display.row(ROWS), None);
    }

    #[test]
    fn test_non_ascii_replaced() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.draw(&RenderCommand::text("ok ♥")).unwrap();
        assert_eq!(display.row(0).unwrap().trim_end(), "ok ?");
    }
}
