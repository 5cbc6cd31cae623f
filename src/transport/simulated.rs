//! Scripted transport that replays frames without any radio hardware.
//!
//! Used by `run --simulate`, the demo and the integration tests. Frames are
//! replayed on a background thread. In the default mode each frame is
//! stamped with `base_time + offset` and sent immediately, which keeps tests
//! deterministic. In paced mode the thread sleeps between frames and stamps
//! them with the real time.

use crate::transport::types::{Notification, RawFrame, HEART_RATE_MEASUREMENT};
use crate::transport::{Transport, TransportError};
use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1_024;

/// A frame scheduled `offset` after the subscription starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFrame {
    pub offset: Duration,
    pub frame: RawFrame,
}

impl ScriptedFrame {
    pub fn new(offset: Duration, frame: impl Into<RawFrame>) -> Self {
        Self {
            offset,
            frame: frame.into(),
        }
    }
}

/// A transport that replays a fixed script and then disconnects.
pub struct SimulatedTransport {
    script: Vec<ScriptedFrame>,
    base_time: DateTime<Utc>,
    paced: bool,
    refuse_connect: bool,
    connected: Arc<AtomicBool>,
}

impl SimulatedTransport {
    pub fn new(script: Vec<ScriptedFrame>) -> Self {
        Self {
            script,
            base_time: Utc::now(),
            paced: false,
            refuse_connect: false,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Timestamp offsets are applied to `base_time` in unpaced mode.
    pub fn with_base_time(mut self, base_time: DateTime<Utc>) -> Self {
        self.base_time = base_time;
        self
    }

    /// Sleep between frames and stamp them with the real time.
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Make every connection attempt fail.
    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    /// Number of frames not yet handed to a subscriber.
    pub fn pending_frames(&self) -> usize {
        self.script.len()
    }
}

impl Transport for SimulatedTransport {
    fn connect(&mut self, address: &str, _timeout: Duration) -> Result<(), TransportError> {
        if self.refuse_connect {
            return Err(TransportError::ConnectionFailed(format!(
                "simulated sensor {address} refused the connection"
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        tracing::debug!(address, frames = self.script.len(), "simulated sensor connected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn subscribe(&mut self, characteristic: Uuid) -> Result<Receiver<Notification>, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        if characteristic != HEART_RATE_MEASUREMENT {
            return Err(TransportError::CharacteristicNotFound(characteristic));
        }

        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        let script = std::mem::take(&mut self.script);
        let connected = Arc::clone(&self.connected);
        let base_time = self.base_time;
        let paced = self.paced;

        thread::Builder::new()
            .name("simulated-sensor".to_string())
            .spawn(move || {
                let mut previous = Duration::ZERO;
                for scripted in script {
                    if paced {
                        thread::sleep(scripted.offset.saturating_sub(previous));
                        previous = scripted.offset;
                    }
                    if !connected.load(Ordering::SeqCst) {
                        return;
                    }

                    let received_at = if paced {
                        Utc::now()
                    } else {
                        base_time
                            + chrono::Duration::from_std(scripted.offset)
                                .unwrap_or_else(|_| chrono::Duration::zero())
                    };
                    if sender
                        .send(Notification::at(scripted.frame, received_at))
                        .is_err()
                    {
                        break;
                    }
                }
                connected.store(false, Ordering::SeqCst);
            })
            .map_err(|e| TransportError::Backend(format!("failed to spawn replay thread: {e}")))?;

        Ok(receiver)
    }

    fn disconnect(&mut self) -> Result<(), TransportError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A synthetic workout: strap not yet in contact, `active_secs` of exercise
/// sampled once per second, then the strap coming off.
///
/// One truncated frame is included mid-workout, as real straps occasionally
/// send one.
pub fn workout_script(active_secs: u64) -> Vec<ScriptedFrame> {
    const NO_CONTACT: u8 = 0b0000_0100;
    const CONTACT: u8 = 0b0000_0110;
    const LEAD_IN: u64 = 3;

    let mut script = Vec::new();
    let mut second = 0u64;

    for _ in 0..LEAD_IN {
        script.push(ScriptedFrame::new(
            Duration::from_secs(second),
            vec![NO_CONTACT, 0],
        ));
        second += 1;
    }

    for i in 0..active_secs {
        let ramp = i.min(60) as u16;
        let wobble = (i % 7) as u16;
        let bpm = 70 + ramp + wobble;
        let frame = if i == active_secs / 2 {
            vec![CONTACT | 0x01, bpm as u8]
        } else if i % 10 == 9 {
            let [lo, hi] = bpm.to_le_bytes();
            vec![CONTACT | 0x01, lo, hi]
        } else {
            vec![CONTACT, bpm as u8]
        };
        script.push(ScriptedFrame::new(Duration::from_secs(second), frame));
        second += 1;
    }

    for _ in 0..LEAD_IN {
        script.push(ScriptedFrame::new(
            Duration::from_secs(second),
            vec![NO_CONTACT, 0],
        ));
        second += 1;
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decode;

    #[test]
    fn test_refuses_connection() {
        let mut transport = SimulatedTransport::new(Vec::new()).refusing_connections();
        let result = transport.connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::ConnectionFailed(_))));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_subscribe_requires_connection() {
        let mut transport = SimulatedTransport::new(Vec::new());
        assert!(matches!(
            transport.subscribe(HEART_RATE_MEASUREMENT),
            Err(TransportError::NotConnected)
        ));
    }

    #[test]
    fn test_unknown_characteristic() {
        let mut transport = SimulatedTransport::new(Vec::new());
        transport
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .unwrap();
        assert!(matches!(
            transport.subscribe(Uuid::nil()),
            Err(TransportError::CharacteristicNotFound(_))
        ));
    }

    #[test]
    fn test_replays_in_order_with_offsets() {
        let base = Utc::now();
        let mut transport = SimulatedTransport::new(vec![
            ScriptedFrame::new(Duration::ZERO, vec![0x00, 72]),
            ScriptedFrame::new(Duration::from_secs(130), vec![0x00, 75]),
        ])
        .with_base_time(base);

        transport
            .connect("AA:BB:CC:DD:EE:FF", Duration::from_secs(1))
            .unwrap();
        let receiver = transport.subscribe(HEART_RATE_MEASUREMENT).unwrap();
        assert_eq!(transport.pending_frames(), 0);

        let received: Vec<Notification> = receiver.iter().collect();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].frame.as_bytes(), &[0x00, 72]);
        assert_eq!(received[0].received_at, base);
        assert_eq!(
            received[1].received_at,
            base + chrono::Duration::seconds(130)
        );

        // Channel closed after the script, so the replay thread is done
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_workout_script_shape() {
        let script = workout_script(20);
        assert_eq!(script.len(), 26);

        let values: Vec<Option<u16>> = script
            .iter()
            .map(|s| decode(s.frame.as_bytes()).ok().map(|r| r.value))
            .collect();

        assert_eq!(values[0], Some(0));
        assert_eq!(values[3], Some(70));
        assert_eq!(values[25], Some(0));
        // The truncated frame in the middle
        assert_eq!(values.iter().filter(|v| v.is_none()).count(), 1);
        // Offsets are one second apart
        assert_eq!(script[25].offset, Duration::from_secs(25));
    }
}
