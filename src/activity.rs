//! Debounced user-activity bookkeeping.
//!
//! The tracker records the most recent qualifying activity timestamp and
//! derives the remaining time in the inactivity window from it. Callers may
//! forward raw input events at any rate; recordings are collapsed to at most
//! one per debounce window.

use std::time::SystemTime;
use tokio::time::{Duration, Instant};

/// Tracks the most recent user activity for one session.
///
/// All timing arithmetic uses a monotonic [`Instant`]; the wall-clock
/// [`SystemTime`] of the last recorded activity is kept alongside for
/// display surfaces (countdowns, debug panels).
#[derive(Debug)]
pub(crate) struct ActivityTracker {
    timeout: Duration,
    debounce: Duration,
    last_activity: Instant,
    last_active_at: SystemTime,
    is_idle: bool,
}

impl ActivityTracker {
    pub fn new(timeout: Duration, debounce: Duration, now: Instant) -> Self {
        Self {
            timeout,
            debounce,
            last_activity: now,
            last_active_at: SystemTime::now(),
            is_idle: false,
        }
    }

    /// Record a qualifying activity event.
    ///
    /// Returns `true` if the event was recorded, `false` if it fell inside
    /// the debounce window of the previous recording.
    pub fn record(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_activity) < self.debounce {
            return false;
        }
        self.last_activity = now;
        self.last_active_at = SystemTime::now();
        true
    }

    /// Restart the full inactivity window and clear the idle flag.
    ///
    /// Unlike [`record`](Self::record) this is never debounced: it must be
    /// callable at any time and is the sole recovery path out of an idle or
    /// warning state short of logging out.
    pub fn reset(&mut self, now: Instant) {
        self.last_activity = now;
        self.last_active_at = SystemTime::now();
        self.is_idle = false;
    }

    /// Remaining time in the inactivity window, clamped to `[0, timeout]`.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.timeout
            .saturating_sub(now.saturating_duration_since(self.last_activity))
    }

    pub fn is_idle(&self) -> bool {
        self.is_idle
    }

    /// Update the idle flag on an idle/active transition.
    pub fn set_idle(&mut self, idle: bool) {
        self.is_idle = idle;
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn last_active_at(&self) -> SystemTime {
        self.last_active_at
    }
}
