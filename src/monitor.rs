//! The idle monitor task and its handle.
//!
//! One spawned task owns all session state: the activity clock, the warning
//! state machine, and the single auto-logout timer. Everything else talks to
//! it over channels, so recomputation never runs in parallel with itself and
//! a reset processed before the deadline fires disarms the timer before it
//! can execute.
//!
//! # Tracing Events
//!
//! - `session.monitor.started` - monitor task spawned
//! - `session.monitor.stopped` - monitor task exited
//! - `session.logout.failed` - terminator returned an error (logout is still
//!   locally complete)

use crate::clock::{ClockView, IdleClock};
use crate::config::MonitorConfig;
use crate::error::Result;
use crate::terminator::SessionTerminator;
use crate::warning::{Phase, Transition, WarningController};
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, Sleep, sleep_until};

/// Snapshot of the monitored session, republished on every recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorStatus {
    /// Whether the inactivity timeout has elapsed without qualifying activity.
    pub is_idle: bool,
    /// Time left before forced logout, clamped to `[0, timeout]`.
    pub time_remaining: Duration,
    /// Wall-clock time of the last recorded activity.
    pub last_active_at: SystemTime,
    /// Current lifecycle phase.
    pub phase: Phase,
}

impl MonitorStatus {
    /// Whether the pre-logout warning prompt should be visible.
    pub fn warning_visible(&self) -> bool {
        self.phase.is_warning()
    }

    /// Whether the session has been terminated.
    pub fn logged_out(&self) -> bool {
        self.phase.is_logged_out()
    }
}

enum Command {
    Activity,
    Reset,
    Logout,
    Shutdown,
}

/// Cloneable read/trigger surface for UI components.
///
/// Consumers read the published status or send one of the exposed mutators;
/// the monitor task remains the only writer of session state. All methods
/// are no-ops once the monitor has stopped.
#[derive(Clone)]
pub struct MonitorHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<MonitorStatus>,
}

impl MonitorHandle {
    /// Latest published session snapshot.
    pub fn status(&self) -> MonitorStatus {
        self.status_rx.borrow().clone()
    }

    /// Subscribe to status updates (one per recomputation).
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.status_rx.clone()
    }

    /// Forward a qualifying user-activity event (pointer, key, scroll,
    /// touch). Debounced inside the monitor; safe to call at any rate.
    pub fn record_activity(&self) {
        let _ = self.cmd_tx.send(Command::Activity);
    }

    /// Restart the full inactivity window and dismiss any open warning.
    ///
    /// Idempotent; the sole recovery path out of an idle or warning state
    /// short of logging out.
    pub fn reset_timer(&self) {
        let _ = self.cmd_tx.send(Command::Reset);
    }

    /// Terminate the session now.
    pub fn logout_now(&self) {
        let _ = self.cmd_tx.send(Command::Logout);
    }

    /// Convenience accessor for [`MonitorStatus::is_idle`].
    pub fn is_idle(&self) -> bool {
        self.status_rx.borrow().is_idle
    }

    /// Convenience accessor for [`MonitorStatus::time_remaining`].
    pub fn time_remaining(&self) -> Duration {
        self.status_rx.borrow().time_remaining
    }

    /// Convenience accessor for [`MonitorStatus::last_active_at`].
    pub fn last_active_at(&self) -> SystemTime {
        self.status_rx.borrow().last_active_at
    }
}

/// Owns the monitor task for one authenticated session.
///
/// Created on login/mount, torn down on logout/unmount. Dropping the monitor
/// cancels the tick and any armed auto-logout deadline, so a pending logout
/// can never fire against a torn-down session.
pub struct IdleMonitor {
    handle: MonitorHandle,
    task: Option<JoinHandle<()>>,
}

impl IdleMonitor {
    /// Validate the configuration and spawn the monitor task.
    pub fn spawn(config: MonitorConfig, terminator: Arc<dyn SessionTerminator>) -> Result<Self> {
        config.validate()?;

        let now = Instant::now();
        let clock = IdleClock::new(config.timeout(), config.debounce(), now);
        let controller = WarningController::new(config.warning_threshold());

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(MonitorStatus {
            is_idle: false,
            time_remaining: config.timeout(),
            last_active_at: SystemTime::now(),
            phase: Phase::Normal,
        });

        tracing::info!(
            target: "session.monitor.started",
            timeout_ms = config.timeout_ms,
            warning_threshold_ms = config.warning_threshold_ms,
            "Idle monitor started"
        );

        let task = tokio::spawn(run(
            clock,
            controller,
            terminator,
            status_tx,
            cmd_rx,
            config.tick_interval(),
        ));

        Ok(Self {
            handle: MonitorHandle { cmd_tx, status_rx },
            task: Some(task),
        })
    }

    /// Get a cloneable handle for UI consumers.
    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// Latest published session snapshot.
    pub fn status(&self) -> MonitorStatus {
        self.handle.status()
    }

    /// Subscribe to status updates.
    pub fn subscribe(&self) -> watch::Receiver<MonitorStatus> {
        self.handle.subscribe()
    }

    /// Forward a qualifying user-activity event.
    pub fn record_activity(&self) {
        self.handle.record_activity();
    }

    /// Restart the full inactivity window and dismiss any open warning.
    pub fn reset_timer(&self) {
        self.handle.reset_timer();
    }

    /// Terminate the session now.
    pub fn logout_now(&self) {
        self.handle.logout_now();
    }

    /// Stop the monitor and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            let _ = self.handle.cmd_tx.send(Command::Shutdown);
            let _ = task.await;
        }
    }
}

impl Drop for IdleMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// The monitor task loop.
///
/// Suspends only at its three scheduling points: the command channel, the
/// recomputation tick, and the armed auto-logout deadline. `biased` keeps
/// the polling order fixed so a queued reset is always processed before a
/// deadline that expires at the same instant.
async fn run(
    mut clock: IdleClock,
    mut controller: WarningController,
    terminator: Arc<dyn SessionTerminator>,
    status_tx: watch::Sender<MonitorStatus>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    tick_interval: Duration,
) {
    let mut ticker = tokio::time::interval(tick_interval);
    let mut deadline: Option<Pin<Box<Sleep>>> = None;

    loop {
        tokio::select! {
            biased;

            cmd = cmd_rx.recv() => {
                let now = Instant::now();
                let terminated = match cmd {
                    Some(Command::Activity) => {
                        if !clock.record_activity(now) {
                            // Collapsed by the debounce window; nothing changed
                            continue;
                        }
                        apply(controller.reset(), &mut deadline, &terminator)
                    }
                    Some(Command::Reset) => {
                        clock.reset(now);
                        apply(controller.reset(), &mut deadline, &terminator)
                    }
                    Some(Command::Logout) => {
                        apply(controller.logout_now(), &mut deadline, &terminator)
                    }
                    Some(Command::Shutdown) | None => break,
                };

                publish(&status_tx, clock.tick(now), controller.phase());
                if terminated {
                    break;
                }
            }

            _ = async { deadline.as_mut().unwrap().await }, if deadline.is_some() => {
                let now = Instant::now();
                let terminated = apply(
                    controller.deadline_elapsed(),
                    &mut deadline,
                    &terminator,
                );

                publish(&status_tx, clock.tick(now), controller.phase());
                if terminated {
                    break;
                }
            }

            _ = ticker.tick() => {
                let now = Instant::now();
                let view = clock.tick(now);
                let terminated = apply(
                    controller.observe(view.remaining, now),
                    &mut deadline,
                    &terminator,
                );

                publish(&status_tx, clock.tick(now), controller.phase());
                if terminated {
                    break;
                }
            }
        }
    }

    tracing::debug!(target: "session.monitor.stopped", "Idle monitor stopped");
}

/// Execute the effect of a state-machine transition.
///
/// Returns `true` when the session was terminated and the task should stop.
fn apply(
    transition: Transition,
    deadline: &mut Option<Pin<Box<Sleep>>>,
    terminator: &Arc<dyn SessionTerminator>,
) -> bool {
    match transition {
        Transition::None => false,
        Transition::Arm(at) => {
            // Replacing the slot drops any previously armed timer
            *deadline = Some(Box::pin(sleep_until(at)));
            false
        }
        Transition::Disarm => {
            *deadline = None;
            false
        }
        Transition::Terminate => {
            *deadline = None;
            // Fire-and-forget: the session is logged out locally whether or
            // not the remote notification succeeds
            let terminator = Arc::clone(terminator);
            tokio::spawn(async move {
                if let Err(e) = terminator.terminate().await {
                    tracing::error!(
                        target: "session.logout.failed",
                        error = %e,
                        "Remote logout failed; local session is cleared regardless"
                    );
                }
            });
            true
        }
    }
}

fn publish(status_tx: &watch::Sender<MonitorStatus>, view: ClockView, phase: Phase) {
    let _ = status_tx.send(MonitorStatus {
        is_idle: view.is_idle,
        time_remaining: view.remaining,
        last_active_at: view.last_active_at,
        phase,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminator::test::RecordingTerminator;
    use tokio::time::advance;

    fn config(timeout_ms: u64, warning_ms: u64) -> MonitorConfig {
        MonitorConfig::builder()
            .timeout_ms(timeout_ms)
            .warning_threshold_ms(warning_ms)
            .debounce_ms(500)
            .tick_interval_ms(1_000)
            .build()
    }

    /// Let the monitor task process everything that is currently runnable.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_spawn_rejects_invalid_config() {
        let terminator = Arc::new(RecordingTerminator::new());
        let result = IdleMonitor::spawn(config(1_000, 1_000), terminator);
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_status() {
        let terminator = Arc::new(RecordingTerminator::new());
        let monitor = IdleMonitor::spawn(config(5_000, 2_000), terminator).unwrap();
        settle().await;

        let status = monitor.status();
        assert!(!status.is_idle);
        assert!(!status.warning_visible());
        assert_eq!(status.time_remaining, Duration::from_millis(5_000));

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_warning_opens_and_auto_logout_fires() {
        let terminator = Arc::new(RecordingTerminator::new());
        let monitor =
            IdleMonitor::spawn(config(5_000, 2_000), terminator.clone()).unwrap();
        settle().await;

        advance(Duration::from_millis(3_000)).await;
        settle().await;
        assert!(monitor.status().warning_visible());
        assert_eq!(terminator.calls(), 0);

        advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert!(monitor.status().logged_out());
        assert_eq!(terminator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_disarms_pending_logout() {
        let terminator = Arc::new(RecordingTerminator::new());
        let monitor =
            IdleMonitor::spawn(config(5_000, 2_000), terminator.clone()).unwrap();
        settle().await;

        advance(Duration::from_millis(3_000)).await;
        settle().await;
        assert!(monitor.status().warning_visible());

        monitor.reset_timer();
        settle().await;
        assert!(!monitor.status().warning_visible());
        assert_eq!(monitor.status().time_remaining, Duration::from_millis(5_000));

        // The old deadline passes without a logout
        advance(Duration::from_millis(2_500)).await;
        settle().await;
        assert_eq!(terminator.calls(), 0);
        assert!(!monitor.status().logged_out());

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_logout_calls_terminator_once() {
        let terminator = Arc::new(RecordingTerminator::new());
        let monitor =
            IdleMonitor::spawn(config(5_000, 2_000), terminator.clone()).unwrap();
        settle().await;

        monitor.logout_now();
        settle().await;
        assert!(monitor.status().logged_out());
        assert_eq!(terminator.calls(), 1);

        // Further commands are no-ops against a stopped monitor
        monitor.logout_now();
        monitor.reset_timer();
        settle().await;
        assert_eq!(terminator.calls(), 1);
        assert!(monitor.status().logged_out());
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminator_failure_still_logs_out_locally() {
        let terminator = Arc::new(RecordingTerminator::failing());
        let monitor =
            IdleMonitor::spawn(config(5_000, 2_000), terminator.clone()).unwrap();
        settle().await;

        advance(Duration::from_millis(5_000)).await;
        settle().await;

        assert!(monitor.status().logged_out());
        assert_eq!(terminator.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_is_cloneable_and_reads_status() {
        let terminator = Arc::new(RecordingTerminator::new());
        let monitor = IdleMonitor::spawn(config(5_000, 2_000), terminator).unwrap();
        settle().await;

        let handle = monitor.handle();
        let handle2 = handle.clone();

        advance(Duration::from_millis(1_000)).await;
        settle().await;

        assert_eq!(handle.time_remaining(), Duration::from_millis(4_000));
        assert_eq!(handle2.time_remaining(), Duration::from_millis(4_000));
        assert!(!handle.is_idle());

        monitor.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_publishing() {
        let terminator = Arc::new(RecordingTerminator::new());
        let monitor =
            IdleMonitor::spawn(config(5_000, 2_000), terminator.clone()).unwrap();
        settle().await;

        let handle = monitor.handle();
        monitor.shutdown().await;

        let before = handle.status();
        advance(Duration::from_millis(10_000)).await;
        settle().await;

        assert_eq!(handle.status(), before);
        assert_eq!(terminator.calls(), 0);
    }
}
