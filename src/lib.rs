//! Pulse Display - live heart-rate and workout timer for BLE chest straps.
//!
//! This library decodes Heart Rate Measurement notifications from a sensor,
//! tracks how long the current workout has been running, and renders the
//! result to a small monochrome display.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                           Pulse Display                           │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────┐   ┌─────────┐   ┌────────┐           │
//! │  │ Transport │──▶│ Decoder │──▶│  Timer  │──▶│ Render │──▶ Display│
//! │  │ (BLE/sim) │   │ (frame) │   │(workout)│   │(cmds)  │           │
//! │  └───────────┘   └─────────┘   └─────────┘   └────────┘           │
//! │        ▲                                                          │
//! │        └──────────── Session (liveness polling) ──────────────────│
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use pulse_display::{
//!     config::Config,
//!     display::TerminalDisplay,
//!     session::Session,
//!     transport::{workout_script, SimulatedTransport},
//! };
//!
//! let transport = SimulatedTransport::new(workout_script(60)).paced(true);
//! let mut session = Session::new(transport, TerminalDisplay::stdout(), Config::default());
//! let outcome = session.run("EB:D4:07:40:52:A0").expect("session failed");
//! println!("{outcome:?}");
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod session;
pub mod stats;
pub mod transport;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use crate::core::{
    decode, render, DecodeError, Flags, Reading, RenderCommand, TimerEvent, WorkoutTimer,
};
pub use display::{DisplayError, DisplaySink, RecordingDisplay, TerminalDisplay};
pub use session::{Session, SessionError, SessionOutcome};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};
pub use transport::{
    Notification, RawFrame, SimulatedTransport, Transport, TransportError,
    HEART_RATE_MEASUREMENT,
};

#[cfg(feature = "ble")]
pub use transport::BleTransport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
