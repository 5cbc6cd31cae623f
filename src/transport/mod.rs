//! Sensor transports.
//!
//! A transport connects to a heart-rate sensor and delivers its notifications
//! over a channel consumed by the session loop. The simulated transport is
//! always available; the Bluetooth LE one needs the `ble` feature.

pub mod simulated;
pub mod types;

#[cfg(feature = "ble")]
pub mod ble;

use crossbeam_channel::Receiver;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

// Re-export commonly used types
pub use simulated::{workout_script, ScriptedFrame, SimulatedTransport};
pub use types::{Notification, RawFrame, HEART_RATE_MEASUREMENT};

#[cfg(feature = "ble")]
pub use ble::BleTransport;

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timed out connecting to sensor")]
    Timeout,

    #[error("Sensor {0} not found")]
    DeviceNotFound(String),

    #[error("Characteristic {0} not found")]
    CharacteristicNotFound(Uuid),

    #[error("Not connected")]
    NotConnected,

    #[error("Transport backend error: {0}")]
    Backend(String),
}

/// Connection to a single notifying sensor.
pub trait Transport {
    /// Connect to the sensor at `address`, giving up after `timeout`.
    fn connect(&mut self, address: &str, timeout: Duration) -> Result<(), TransportError>;

    /// Whether the link is still up.
    fn is_connected(&self) -> bool;

    /// Subscribe to notifications from `characteristic`.
    ///
    /// Notifications arrive on the returned channel in the order received.
    /// The channel closes when the link goes down.
    fn subscribe(&mut self, characteristic: Uuid) -> Result<Receiver<Notification>, TransportError>;

    fn disconnect(&mut self) -> Result<(), TransportError>;
}
