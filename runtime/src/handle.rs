//! Tracking of running effects

use crate::StoreError;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Counts running effects and wakes waiters when the count reaches zero
///
/// One is created per `send` (behind its [`EffectHandle`]) and one lives in
/// the store for shutdown.
#[derive(Clone)]
pub(crate) struct InFlight {
    count: Arc<AtomicUsize>,
    idle: Arc<watch::Sender<()>>,
}

impl InFlight {
    pub(crate) fn new() -> Self {
        let (idle, _) = watch::channel(());
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            idle: Arc::new(idle),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Registers one running effect until the guard is dropped
    pub(crate) fn enter(&self) -> InFlightGuard {
        self.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(self.clone())
    }

    /// Resolves once no effect is registered
    pub(crate) async fn idle(&self) {
        // Subscribe before reading the count so a concurrent drop to zero is seen
        let mut rx = self.idle.subscribe();
        while self.count() > 0 {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

/// Deregisters an effect on drop, including when the effect task panics
pub(crate) struct InFlightGuard(InFlight);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.send_replace(());
        }
    }
}

/// Waits for the effects started by one [`Store::send`](crate::Store::send)
///
/// An effect counts as finished once the action it produced (if any) has been
/// reduced. After `wait()` returns, the state reflects the settled result.
/// Effects started by that follow-up action are not included.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(PostsAction::FetchPosts.into()).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    in_flight: InFlight,
}

impl EffectHandle {
    pub(crate) fn new() -> (Self, InFlight) {
        let in_flight = InFlight::new();
        (
            Self {
                in_flight: in_flight.clone(),
            },
            in_flight,
        )
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self {
            in_flight: InFlight::new(),
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight.count()
    }

    /// Wait until every effect has finished
    pub async fn wait(&mut self) {
        self.in_flight.idle().await;
    }

    /// [`wait`](Self::wait) bounded by `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the
    /// timeout elapses.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}
