//! Core functionality for the pulse display.
//!
//! This module contains:
//! - Frame decoding for Heart Rate Measurement notifications
//! - The workout timer state machine
//! - Mapping timer events to display commands

pub mod decoder;
pub mod render;
pub mod timer;

// Re-export commonly used types
pub use decoder::{decode, DecodeError, Flags, Reading, ValueFormat};
pub use render::{
    connection_status_text, format_bpm, format_elapsed, render, RenderCommand,
};
pub use timer::{TimerEvent, WorkoutState, WorkoutTimer};
