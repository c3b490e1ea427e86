//! Warning state machine.
//!
//! Drives the pre-logout warning prompt and the auto-logout deadline as an
//! explicit finite-state machine. The controller decides transitions; the
//! owning monitor task executes their effects (arming or disarming the single
//! timer, invoking the terminator). Keeping the two apart makes every
//! transition unit-testable without timers.
//!
//! # Tracing Events
//!
//! - `session.warning.opened` - warning prompt opened, deadline armed
//! - `session.warning.dismissed` - session continued, deadline disarmed
//! - `session.logout.auto` - auto-logout deadline reached
//! - `session.logout.explicit` - user chose to log out now

use tokio::time::{Duration, Instant};

/// Lifecycle phase of the monitored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Activity within the window; no warning shown.
    Normal,
    /// Warning prompt is visible; logout fires at `deadline` absent a reset.
    Warning {
        /// Absolute time at which the session is forcibly terminated.
        deadline: Instant,
    },
    /// Session terminated. Terminal: a fresh login produces a fresh monitor.
    LoggedOut,
}

impl Phase {
    /// Whether the warning prompt is visible.
    pub fn is_warning(&self) -> bool {
        matches!(self, Phase::Warning { .. })
    }

    /// Whether the session has been terminated.
    pub fn is_logged_out(&self) -> bool {
        matches!(self, Phase::LoggedOut)
    }

    /// The armed auto-logout deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        match self {
            Phase::Warning { deadline } => Some(*deadline),
            _ => None,
        }
    }
}

/// Effect the owning task must carry out after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// No state change; nothing to do.
    None,
    /// Entered Warning: arm the auto-logout timer for the given deadline,
    /// replacing any previously armed timer.
    Arm(Instant),
    /// Returned to Normal: cancel the armed timer before anything else can
    /// observe it.
    Disarm,
    /// Entered LoggedOut: cancel the timer and invoke the terminator once.
    Terminate,
}

/// The Normal/Warning/LoggedOut state machine.
#[derive(Debug)]
pub(crate) struct WarningController {
    warning_threshold: Duration,
    phase: Phase,
}

impl WarningController {
    pub fn new(warning_threshold: Duration) -> Self {
        Self {
            warning_threshold,
            phase: Phase::Normal,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// React to a recomputed remaining time.
    ///
    /// The deadline is computed once, on the Normal -> Warning transition,
    /// as `now + remaining` - not `now + threshold`, so it stays correct
    /// when the first observation is already past the threshold. Further
    /// observations while Warning never re-arm the timer.
    pub fn observe(&mut self, remaining: Duration, now: Instant) -> Transition {
        match self.phase {
            Phase::LoggedOut => Transition::None,

            Phase::Normal => {
                if remaining.is_zero() {
                    // Threshold crossing and expiry landed in the same
                    // recomputation: pass through Warning into LoggedOut
                    // with a single terminator invocation.
                    self.phase = Phase::LoggedOut;
                    tracing::info!(
                        target: "session.logout.auto",
                        "Inactivity timeout expired, terminating session"
                    );
                    Transition::Terminate
                } else if remaining <= self.warning_threshold {
                    let deadline = now + remaining;
                    self.phase = Phase::Warning { deadline };
                    tracing::info!(
                        target: "session.warning.opened",
                        remaining_ms = remaining.as_millis() as u64,
                        "Idle warning opened, auto-logout armed"
                    );
                    Transition::Arm(deadline)
                } else {
                    Transition::None
                }
            }

            Phase::Warning { deadline } => {
                if remaining.is_zero() || now >= deadline {
                    self.phase = Phase::LoggedOut;
                    tracing::info!(
                        target: "session.logout.auto",
                        "Inactivity timeout expired, terminating session"
                    );
                    Transition::Terminate
                } else {
                    Transition::None
                }
            }
        }
    }

    /// The armed auto-logout timer elapsed.
    pub fn deadline_elapsed(&mut self) -> Transition {
        match self.phase {
            Phase::Warning { .. } => {
                self.phase = Phase::LoggedOut;
                tracing::info!(
                    target: "session.logout.auto",
                    "Auto-logout deadline reached, terminating session"
                );
                Transition::Terminate
            }
            // A disarmed or already-terminated session ignores stale firings.
            _ => Transition::None,
        }
    }

    /// Explicit "continue session" or qualifying activity.
    ///
    /// From Warning this disarms the pending auto-logout before it can fire;
    /// from Normal it is a no-op beyond the clock reset the caller performs.
    pub fn reset(&mut self) -> Transition {
        match self.phase {
            Phase::Warning { .. } => {
                self.phase = Phase::Normal;
                tracing::info!(
                    target: "session.warning.dismissed",
                    "Session continued, auto-logout disarmed"
                );
                Transition::Disarm
            }
            _ => Transition::None,
        }
    }

    /// Explicit "log out now" action.
    pub fn logout_now(&mut self) -> Transition {
        match self.phase {
            Phase::LoggedOut => Transition::None,
            _ => {
                self.phase = Phase::LoggedOut;
                tracing::info!(
                    target: "session.logout.explicit",
                    "User requested logout"
                );
                Transition::Terminate
            }
        }
    }
}
