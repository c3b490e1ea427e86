/// The main error type for idlewatch
#[derive(Debug, thiserror::Error)]
pub enum IdlewatchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Monitor is no longer running")]
    MonitorClosed,

    #[error("Session termination failed: {0}")]
    Terminator(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IdlewatchError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn monitor_closed() -> Self {
        Self::MonitorClosed
    }

    pub fn terminator(msg: impl Into<String>) -> Self {
        Self::Terminator(msg.into())
    }
}

/// Result type alias for idlewatch operations
pub type Result<T> = std::result::Result<T, IdlewatchError>;
