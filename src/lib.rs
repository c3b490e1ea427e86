//! Idlewatch - session idle monitoring with warning and auto-logout
//!
//! Idlewatch watches an authenticated session for user inactivity. It tracks
//! debounced activity events, republishes the remaining time on a periodic
//! tick, opens a cancelable warning when the session is about to expire, and
//! terminates the session exactly once when the inactivity timeout elapses.
//!
//! # Features
//!
//! - **Activity tracking**: debounced last-activity bookkeeping
//! - **Idle clock**: periodic recomputation of remaining time and idle state
//! - **Warning state machine**: explicit Normal/Warning/LoggedOut phases with
//!   a single owned auto-logout timer, armed and disarmed only on transitions
//! - **Pluggable termination**: bring your own [`SessionTerminator`] for the
//!   logout call; remote failures never block local logout
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use idlewatch::{IdleMonitor, MonitorConfig, SessionTerminator};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Logout;
//!
//! #[async_trait]
//! impl SessionTerminator for Logout {
//!     async fn terminate(&self) -> idlewatch::Result<()> {
//!         // clear credentials, notify the backend, redirect
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> idlewatch::Result<()> {
//!     idlewatch::init_tracing();
//!
//!     let config = MonitorConfig::builder()
//!         .timeout_ms(300_000)
//!         .warning_threshold_ms(10_000)
//!         .build();
//!
//!     let monitor = IdleMonitor::spawn(config, Arc::new(Logout))?;
//!     let handle = monitor.handle();
//!
//!     // forward user input events from the UI layer
//!     handle.record_activity();
//!
//!     // tear down on logout/unmount
//!     monitor.shutdown().await;
//!     Ok(())
//! }
//! ```

mod activity;
mod clock;
mod config;
mod error;
mod monitor;
pub mod terminator;
pub mod utils;
mod warning;

// Re-exports for public API
pub use config::{MonitorConfig, MonitorConfigBuilder};
pub use error::{IdlewatchError, Result};
pub use monitor::{IdleMonitor, MonitorHandle, MonitorStatus};
pub use terminator::SessionTerminator;
pub use warning::Phase;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main()
/// before spawning the monitor.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "idlewatch=debug")
/// - `IDLEWATCH_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("IDLEWATCH_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
