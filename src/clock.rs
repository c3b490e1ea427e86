//! Periodic recomputation of the session's idle view.
//!
//! The clock is a pure step function over the activity tracker: each tick
//! recomputes the remaining time, detects idle/active transitions, and hands
//! the result to the monitor task for publication. It owns no timer itself;
//! the monitor's tick interval drives it, which keeps it testable without a
//! runtime.

use crate::activity::ActivityTracker;
use std::time::SystemTime;
use tokio::time::{Duration, Instant};

/// One recomputed view of the session, as of a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ClockView {
    pub remaining: Duration,
    pub is_idle: bool,
    pub last_active_at: SystemTime,
}

/// Derives remaining time and the idle flag from the activity tracker.
#[derive(Debug)]
pub(crate) struct IdleClock {
    tracker: ActivityTracker,
}

impl IdleClock {
    pub fn new(timeout: Duration, debounce: Duration, now: Instant) -> Self {
        Self {
            tracker: ActivityTracker::new(timeout, debounce, now),
        }
    }

    /// Recompute the session view.
    ///
    /// Flips the tracker's idle flag when the accumulated inactivity reaches
    /// the timeout; the flag flips back only through [`record_activity`]
    /// (Self::record_activity) or [`reset`](Self::reset).
    pub fn tick(&mut self, now: Instant) -> ClockView {
        let remaining = self.tracker.remaining(now);

        if remaining.is_zero() && !self.tracker.is_idle() {
            self.tracker.set_idle(true);
            tracing::debug!(
                target: "session.idle.entered",
                idle_for_ms = now.duration_since(self.tracker.last_activity()).as_millis() as u64,
                "Session became idle"
            );
        }

        ClockView {
            remaining,
            is_idle: self.tracker.is_idle(),
            last_active_at: self.tracker.last_active_at(),
        }
    }

    /// Forward a debounced activity event to the tracker.
    ///
    /// Returns `true` if the event was recorded. A recorded event while idle
    /// transitions the session back to active.
    pub fn record_activity(&mut self, now: Instant) -> bool {
        if !self.tracker.record(now) {
            return false;
        }

        if self.tracker.is_idle() {
            self.tracker.set_idle(false);
            tracing::debug!(
                target: "session.idle.exited",
                "Activity resumed after idle"
            );
        }

        true
    }

    /// Restart the full inactivity window (never debounced).
    pub fn reset(&mut self, now: Instant) {
        self.tracker.reset(now);
    }
}
