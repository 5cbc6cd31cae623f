//! Workout session timing driven by successive readings.
//!
//! A workout session opens on the first reading with a heart rate and closes
//! on the first no-signal reading after it. Elapsed time is measured from the
//! wall-clock timestamp of the opening reading.

use crate::core::decoder::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of feeding one reading to the [`WorkoutTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// A session is open; whole seconds since it opened.
    Active { elapsed_seconds: u64 },
    /// The open session just closed. Emitted once per session.
    SessionEnded,
    /// No session is open and nothing changed.
    Idle,
}

/// Mutable workout state owned by the timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutState {
    /// Set while a session is open
    pub started_at: Option<DateTime<Utc>>,
}

/// State machine tracking the current workout session.
#[derive(Debug, Default)]
pub struct WorkoutTimer {
    state: WorkoutState,
}

impl WorkoutTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the state machine with a reading received at `now`.
    pub fn advance(&mut self, reading: &Reading, now: DateTime<Utc>) -> TimerEvent {
        if reading.has_signal() {
            let started_at = *self.state.started_at.get_or_insert(now);
            TimerEvent::Active {
                elapsed_seconds: whole_seconds_between(started_at, now),
            }
        } else if self.state.started_at.take().is_some() {
            TimerEvent::SessionEnded
        } else {
            TimerEvent::Idle
        }
    }

    /// Whether a session is currently open.
    pub fn is_active(&self) -> bool {
        self.state.started_at.is_some()
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    /// Drop any open session without emitting an event (e.g. on disconnect).
    pub fn reset(&mut self) {
        self.state = WorkoutState::default();
    }
}

/// Whole seconds from `start` to `end`, clamped to zero if `end` is earlier.
fn whole_seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
    u64::try_from((end - start).num_seconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decoder::Flags;
    use chrono::Duration;

    fn reading(value: u16) -> Reading {
        Reading::new(value, Flags::default())
    }

    #[test]
    fn test_first_positive_reading_starts_session() {
        let mut timer = WorkoutTimer::new();
        let t0 = Utc::now();

        assert_eq!(
            timer.advance(&reading(72), t0),
            TimerEvent::Active { elapsed_seconds: 0 }
        );
        assert!(timer.is_active());
        assert_eq!(timer.state().started_at, Some(t0));
    }

    #[test]
    fn test_elapsed_seconds() {
        let mut timer = WorkoutTimer::new();
        let t0 = Utc::now();
        timer.advance(&reading(72), t0);

        assert_eq!(
            timer.advance(&reading(90), t0 + Duration::seconds(5)),
            TimerEvent::Active { elapsed_seconds: 5 }
        );
        assert_eq!(
            timer.advance(&reading(90), t0 + Duration::milliseconds(7_999)),
            TimerEvent::Active { elapsed_seconds: 7 }
        );
    }

    #[test]
    fn test_session_end_is_emitted_once() {
        let mut timer = WorkoutTimer::new();
        let t0 = Utc::now();
        timer.advance(&reading(72), t0);

        assert_eq!(
            timer.advance(&reading(0), t0 + Duration::seconds(1)),
            TimerEvent::SessionEnded
        );
        assert_eq!(
            timer.advance(&reading(0), t0 + Duration::seconds(2)),
            TimerEvent::Idle
        );
        assert!(!timer.is_active());
    }

    #[test]
    fn test_zero_without_session_is_idle() {
        let mut timer = WorkoutTimer::new();
        assert_eq!(timer.advance(&reading(0), Utc::now()), TimerEvent::Idle);
    }

    #[test]
    fn test_new_session_restarts_clock() {
        let mut timer = WorkoutTimer::new();
        let t0 = Utc::now();
        timer.advance(&reading(72), t0);
        timer.advance(&reading(0), t0 + Duration::seconds(60));

        let t1 = t0 + Duration::seconds(90);
        assert_eq!(
            timer.advance(&reading(80), t1),
            TimerEvent::Active { elapsed_seconds: 0 }
        );
        assert_eq!(
            timer.advance(&reading(80), t1 + Duration::seconds(3)),
            TimerEvent::Active { elapsed_seconds: 3 }
        );
    }

    #[test]
    fn test_clock_going_backwards_clamps_to_zero() {
        let mut timer = WorkoutTimer::new();
        let t0 = Utc::now();
        timer.advance(&reading(72), t0);

        assert_eq!(
            timer.advance(&reading(72), t0 - Duration::seconds(10)),
            TimerEvent::Active { elapsed_seconds: 0 }
        );
    }

    #[test]
    fn test_reset_drops_session_silently() {
        let mut timer = WorkoutTimer::new();
        timer.advance(&reading(72), Utc::now());
        timer.reset();

        assert!(!timer.is_active());
        assert_eq!(timer.advance(&reading(0), Utc::now()), TimerEvent::Idle);
    }
}
