//! Frame and notification types delivered by a transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// GATT Heart Rate Measurement characteristic (0x2A37).
pub const HEART_RATE_MEASUREMENT: Uuid = Uuid::from_u128(0x00002a37_0000_1000_8000_00805f9b34fb);

/// An opaque notification payload as received from the sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Colon-separated lowercase hex, e.g. `16:48:00`.
    pub fn to_hex(&self) -> String {
        self.0
            .iter()
            .map(|b| hex::encode([*b]))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl From<Vec<u8>> for RawFrame {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for RawFrame {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// A frame together with the time the transport received it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub frame: RawFrame,
    pub received_at: DateTime<Utc>,
}

impl Notification {
    /// Stamp a frame with the current time.
    pub fn new(frame: impl Into<RawFrame>) -> Self {
        Self::at(frame, Utc::now())
    }

    pub fn at(frame: impl Into<RawFrame>, received_at: DateTime<Utc>) -> Self {
        Self {
            frame: frame.into(),
            received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heart_rate_uuid() {
        assert_eq!(
            HEART_RATE_MEASUREMENT.to_string(),
            "00002a37-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn test_frame_hex() {
        let frame = RawFrame::new(vec![0x16, 0x48, 0x00]);
        assert_eq!(frame.to_hex(), "16:48:00");
        assert_eq!(frame.len(), 3);
        assert_eq!(RawFrame::new(Vec::new()).to_hex(), "");
    }

    #[test]
    fn test_notification_keeps_timestamp() {
        let at = Utc::now();
        let n = Notification::at(vec![0x00, 60], at);
        assert_eq!(n.received_at, at);
        assert_eq!(n.frame.as_bytes(), &[0x00, 60]);
    }
}
