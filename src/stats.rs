//! Counters for what the monitor has processed since it started.
//!
//! Kept in memory only and logged as a summary when the monitor stops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for the current process.
#[derive(Debug)]
pub struct SessionStats {
    /// Frames delivered by the transport
    frames_received: AtomicU64,
    /// Frames skipped because they failed to decode
    decode_failures: AtomicU64,
    /// Commands sent to the display
    display_updates: AtomicU64,
    /// Workout sessions that ran to a no-signal reading
    workouts_completed: AtomicU64,
    started_at: DateTime<Utc>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            frames_received: AtomicU64::new(0),
            decode_failures: AtomicU64::new(0),
            display_updates: AtomicU64::new(0),
            workouts_completed: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_display_update(&self) {
        self.display_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_workout_completed(&self) {
        self.workouts_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            display_updates: self.display_updates.load(Ordering::Relaxed),
            workouts_completed: self.workouts_completed.load(Ordering::Relaxed),
            started_at: self.started_at,
            uptime_secs: u64::try_from((Utc::now() - self.started_at).num_seconds())
                .unwrap_or(0),
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Monitor Statistics:\n\
             - Frames received: {}\n\
             - Frames skipped (malformed): {}\n\
             - Display updates: {}\n\
             - Workouts completed: {}\n\
             - Uptime: {} seconds",
            stats.frames_received,
            stats.decode_failures,
            stats.display_updates,
            stats.workouts_completed,
            stats.uptime_secs
        )
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_received: u64,
    pub decode_failures: u64,
    pub display_updates: u64,
    pub workouts_completed: u64,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Thread-safe shared statistics.
pub type SharedSessionStats = Arc<SessionStats>;

pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}
