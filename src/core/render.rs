//! Mapping timer events to display commands.
//!
//! Commands carry semantic content only. Layout, fonts and pixel geometry are
//! left to the [`DisplaySink`](crate::display::DisplaySink).

use crate::core::decoder::Reading;
use crate::core::timer::TimerEvent;
use serde::{Deserialize, Serialize};

/// A single display update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Heart rate with the elapsed workout time
    ShowReading { bpm: u16, elapsed_seconds: u64 },
    /// Free-form status text
    ShowText { text: String },
    /// Blank the display
    Clear,
}

impl RenderCommand {
    pub fn text(text: impl Into<String>) -> Self {
        RenderCommand::ShowText { text: text.into() }
    }
}

/// Turn a timer event into a display update, if one is needed.
///
/// `Idle` produces nothing so repeated no-signal frames cause no display I/O.
pub fn render(event: TimerEvent, reading: &Reading) -> Option<RenderCommand> {
    match event {
        TimerEvent::Active { elapsed_seconds } => Some(RenderCommand::ShowReading {
            bpm: reading.value,
            elapsed_seconds,
        }),
        TimerEvent::SessionEnded => Some(RenderCommand::Clear),
        TimerEvent::Idle => None,
    }
}

/// Heart rate padded to three digits.
pub fn format_bpm(bpm: u16) -> String {
    format!("{bpm:03}")
}

/// Elapsed time as `MM:SS`. Minutes keep counting past 59.
pub fn format_elapsed(elapsed_seconds: u64) -> String {
    format!("{:02}:{:02}", elapsed_seconds / 60, elapsed_seconds % 60)
}

/// Status line shown when the connection state changes.
pub fn connection_status_text(connected: bool) -> String {
    format!("connected: {connected}")
}
