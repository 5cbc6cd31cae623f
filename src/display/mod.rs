//! Display sinks.
//!
//! A sink accepts [`RenderCommand`]s and commits them on `flush`. Pixel
//! layout and fonts are the sink's business; the core only supplies content.

pub mod recording;
pub mod terminal;

use crate::core::RenderCommand;
use thiserror::Error;

pub use recording::RecordingDisplay;
pub use terminal::TerminalDisplay;

/// Display errors. These are fatal for a session.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Display I/O error: {0}")]
    Io(String),

    #[error("Display unavailable")]
    Unavailable,
}

impl From<std::io::Error> for DisplayError {
    fn from(e: std::io::Error) -> Self {
        DisplayError::Io(e.to_string())
    }
}

/// Something that can show render commands.
pub trait DisplaySink {
    /// Apply a command to the pending frame.
    fn draw(&mut self, command: &RenderCommand) -> Result<(), DisplayError>;

    /// Commit the pending frame to the device.
    fn flush(&mut self) -> Result<(), DisplayError>;

    /// Text geometry as (columns, rows).
    fn dimensions(&self) -> (u8, u8);
}
