//! Process-wide stop signal and the set of live display sessions.
//!
//! Every display session is spawned through [`ShutdownCoordinator::track`].
//! Cancelling the token makes each session flush its queued replies and
//! send a going-away close frame; the coordinator then waits for those
//! sessions, the listener, and the Discord task to finish.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TrackedFuture;
use tracing::{info, warn};

/// Drain budget when the caller passes none.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Stop signal shared by the listener, display sessions and the Discord
/// task, plus a tracker over the display sessions.
pub struct ShutdownCoordinator {
    token: CancellationToken,
    sessions: TaskTracker,
}

impl ShutdownCoordinator {
    /// Coordinator with no sessions and an uncancelled token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            sessions: TaskTracker::new(),
        }
    }

    /// Token the listener, sessions and Discord task wait on.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the token. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether the token is cancelled; new display upgrades are refused
    /// from then on.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wrap a display session so that
    /// [`graceful_shutdown`](Self::graceful_shutdown) waits for its close
    /// frame.
    pub fn track<F: Future>(&self, future: F) -> TrackedFuture<F> {
        self.sessions.track_future(future)
    }

    /// Display sessions still running.
    pub fn tracked_count(&self) -> usize {
        self.sessions.len()
    }

    /// Cancel, then wait up to `timeout` for `handles` and every display
    /// session. Sessions still open at the deadline are left to the runtime
    /// teardown.
    pub async fn graceful_shutdown(&self, handles: Vec<JoinHandle<()>>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);

        self.shutdown();
        let _ = self.sessions.close();
        info!(
            tasks = handles.len(),
            displays = self.sessions.len(),
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "draining display sessions"
        );

        let drain = async {
            let _ = futures::future::join_all(handles).await;
            self.sessions.wait().await;
        };

        if tokio::time::timeout(timeout, drain).await.is_err() {
            warn!(
                displays = self.sessions.len(),
                "drain timed out after {timeout:?}, closing anyway"
            );
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn repeated_shutdown_cancels_once() {
        let coord = ShutdownCoordinator::new();
        let token = coord.token();
        assert!(!coord.is_shutting_down());
        coord.shutdown();
        coord.shutdown();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn drain_waits_for_sessions_to_flush_queued_replies() {
        let coord = ShutdownCoordinator::new();
        let (tx, mut rx) = mpsc::channel::<&'static str>(4);
        tx.try_send("reply one").unwrap();
        tx.try_send("reply two").unwrap();
        let flushed = Arc::new(AtomicUsize::new(0));

        let token = coord.token();
        let counter = flushed.clone();
        let session = tokio::spawn(coord.track(async move {
            token.cancelled().await;
            while rx.try_recv().is_ok() {
                let _ = counter.fetch_add(1, Ordering::SeqCst);
            }
        }));
        assert_eq!(coord.tracked_count(), 1);

        let listener_token = coord.token();
        let listener = tokio::spawn(async move { listener_token.cancelled().await });

        coord.graceful_shutdown(vec![listener], None).await;
        assert_eq!(flushed.load(Ordering::SeqCst), 2);
        assert_eq!(coord.tracked_count(), 0);
        session.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_session_does_not_block_past_the_deadline() {
        let coord = ShutdownCoordinator::new();
        let _stuck = tokio::spawn(coord.track(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        }));

        coord.graceful_shutdown(Vec::new(), Some(Duration::from_millis(100))).await;
        assert!(coord.is_shutting_down());
        assert_eq!(coord.tracked_count(), 1);
    }
}
