//! Session termination seam.
//!
//! The monitor ends a session through this trait. Implementations are
//! expected to clear local session/credential storage, notify the backend on
//! a best-effort basis, and move the application to an unauthenticated view.
//!
//! The monitor treats the call as fire-and-forget: it considers itself logged
//! out before the call completes, and a returned error is logged but never
//! reverses the local logout.

use crate::error::Result;
use async_trait::async_trait;

/// Ends the authenticated session.
///
/// # Example
///
/// ```rust,ignore
/// use idlewatch::SessionTerminator;
/// use async_trait::async_trait;
///
/// struct ApiLogout {
///     client: ApiClient,
///     credentials: CredentialStore,
/// }
///
/// #[async_trait]
/// impl SessionTerminator for ApiLogout {
///     async fn terminate(&self) -> idlewatch::Result<()> {
///         // Local logout is mandatory and happens first
///         self.credentials.clear();
///
///         // Backend notification is best-effort; an error here is
///         // reported by the monitor but changes nothing locally
///         self.client.post_logout().await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SessionTerminator: Send + Sync {
    /// Terminate the session.
    ///
    /// Invoked at most once per monitor lifetime, either when the
    /// auto-logout deadline elapses or on an explicit logout action.
    async fn terminate(&self) -> Result<()>;
}

/// Recording terminator for testing.
#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::error::IdlewatchError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts invocations; optionally fails every call.
    #[derive(Default)]
    pub struct RecordingTerminator {
        calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl RecordingTerminator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            let t = Self::default();
            t.fail.store(true, Ordering::SeqCst);
            t
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SessionTerminator for RecordingTerminator {
        async fn terminate(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(IdlewatchError::terminator("simulated logout failure"));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test::RecordingTerminator;
    use super::*;

    #[tokio::test]
    async fn test_recording_terminator_counts_calls() {
        let terminator = RecordingTerminator::new();
        assert_eq!(terminator.calls(), 0);

        terminator.terminate().await.unwrap();
        terminator.terminate().await.unwrap();
        assert_eq!(terminator.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_terminator_still_counts() {
        let terminator = RecordingTerminator::failing();
        assert!(terminator.terminate().await.is_err());
        assert_eq!(terminator.calls(), 1);
    }
}
