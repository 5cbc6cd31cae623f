//! The monitoring loop.
//!
//! Connects a [`Transport`] to a [`DisplaySink`]: every notification is
//! decoded, fed to the workout timer and rendered, one at a time and in
//! arrival order. The connection is polled for liveness every
//! `poll_interval`; the session ends when the link goes down or shutdown is
//! requested. There is no reconnect.

use crate::config::Config;
use crate::core::{
    connection_status_text, decode, render, RenderCommand, TimerEvent, WorkoutTimer,
};
use crate::display::{DisplayError, DisplaySink};
use crate::stats::{create_shared_stats, SharedSessionStats};
use crate::transport::{Notification, Transport, TransportError, HEART_RATE_MEASUREMENT};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// How a session finished when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The sensor went away
    Disconnected,
    /// Shutdown was requested
    Stopped,
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Display error: {0}")]
    Display(#[from] DisplayError),
}

/// One monitoring session over an exclusively owned transport and display.
pub struct Session<T, D> {
    transport: T,
    display: D,
    timer: WorkoutTimer,
    config: Config,
    stats: SharedSessionStats,
    running: Arc<AtomicBool>,
}

impl<T: Transport, D: DisplaySink> Session<T, D> {
    pub fn new(transport: T, display: D, config: Config) -> Self {
        Self {
            transport,
            display,
            timer: WorkoutTimer::new(),
            config,
            stats: create_shared_stats(),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Share counters with the caller.
    pub fn with_stats(mut self, stats: SharedSessionStats) -> Self {
        self.stats = stats;
        self
    }

    /// Stop the session once `running` is cleared (e.g. from a Ctrl+C handler).
    pub fn with_shutdown(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    pub fn stats(&self) -> &SharedSessionStats {
        &self.stats
    }

    pub fn timer(&self) -> &WorkoutTimer {
        &self.timer
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Connect to the sensor at `address` and monitor it until the session ends.
    pub fn run(&mut self, address: &str) -> Result<SessionOutcome, SessionError> {
        tracing::info!(address, "connecting to sensor");
        self.transport
            .connect(address, self.config.connect_timeout)?;

        let result = self.monitor();

        if let Err(e) = self.transport.disconnect() {
            tracing::debug!("disconnect failed: {e}");
        }
        self.timer.reset();

        match &result {
            Ok(outcome) => tracing::info!(?outcome, "session finished"),
            Err(e) => tracing::error!("session failed: {e}"),
        }
        result
    }

    fn monitor(&mut self) -> Result<SessionOutcome, SessionError> {
        let (columns, rows) = self.display.dimensions();
        tracing::debug!(columns, rows, "display ready");

        if self.config.show_connection_status {
            let status = connection_status_text(self.transport.is_connected());
            self.show(&RenderCommand::text(status))?;
        }

        let receiver = self.transport.subscribe(HEART_RATE_MEASUREMENT)?;
        tracing::info!("subscribed to heart rate notifications");

        let poll_interval = self.config.poll_interval;
        let mut last_liveness_check = Instant::now();

        loop {
            if !self.running.load(Ordering::SeqCst) {
                tracing::info!("shutdown requested");
                return Ok(SessionOutcome::Stopped);
            }

            let wait = poll_interval.saturating_sub(last_liveness_check.elapsed());
            match receiver.recv_timeout(wait) {
                Ok(notification) => {
                    self.handle_notification(&notification)?;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::warn!("notification stream closed");
                    return Ok(SessionOutcome::Disconnected);
                }
            }

            if last_liveness_check.elapsed() >= poll_interval {
                if !self.transport.is_connected() {
                    tracing::warn!("sensor disconnected");
                    self.drain(&receiver)?;
                    return Ok(SessionOutcome::Disconnected);
                }
                last_liveness_check = Instant::now();
            }
        }
    }

    /// Handle frames that were already queued when the link went down.
    fn drain(&mut self, receiver: &Receiver<Notification>) -> Result<(), DisplayError> {
        for notification in receiver.try_iter() {
            self.handle_notification(&notification)?;
        }
        Ok(())
    }

    /// Run one notification through decode, timer and render, and show the
    /// result. Malformed frames are logged and skipped.
    pub fn handle_notification(
        &mut self,
        notification: &Notification,
    ) -> Result<Option<RenderCommand>, DisplayError> {
        self.stats.record_frame();

        let reading = match decode(notification.frame.as_bytes()) {
            Ok(reading) => reading,
            Err(e) => {
                self.stats.record_decode_failure();
                tracing::warn!(raw = %notification.frame.to_hex(), "skipping frame: {e}");
                return Ok(None);
            }
        };
        tracing::trace!(
            bpm = reading.value,
            contact = ?reading.flags.contact(),
            raw = %notification.frame.to_hex(),
            "heart rate"
        );

        let was_active = self.timer.is_active();
        let event = self.timer.advance(&reading, notification.received_at);
        match event {
            TimerEvent::Active { .. } if !was_active => {
                tracing::info!(bpm = reading.value, "workout started");
            }
            TimerEvent::SessionEnded => {
                self.stats.record_workout_completed();
                tracing::info!("workout ended");
            }
            _ => {}
        }

        let command = render(event, &reading);
        if let Some(command) = &command {
            self.show(command)?;
        }
        Ok(command)
    }

    fn show(&mut self, command: &RenderCommand) -> Result<(), DisplayError> {
        self.display.draw(command)?;
        self.display.flush()?;
        self.stats.record_display_update();
        Ok(())
    }
}
