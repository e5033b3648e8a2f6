//! Host-driven request cancellation.
//!
//! ```
//! use outpost_middleware::AbortHandle;
//!
//! let handle = AbortHandle::new();
//! let signal = handle.signal();
//!
//! assert!(!signal.is_aborted());
//! handle.abort();
//! assert!(signal.is_aborted());
//! ```

use tokio::sync::watch;

/// Aborts the request its [`AbortSignal`]s belong to.
///
/// Cloning yields another handle for the same request.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    /// Creates a handle that has not been triggered.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Returns a signal observing this handle.
    #[must_use]
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Aborts the request. Idempotent.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once [`abort`](Self::abort) has been called.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// The observing side of an [`AbortHandle`].
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl AbortSignal {
    /// A signal that never fires.
    #[must_use]
    pub const fn never() -> Self {
        Self { rx: None }
    }

    /// Returns true if the request has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Completes when the request is aborted. Pends forever if the handle is
    /// dropped without aborting.
    pub async fn aborted(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            if rx.wait_for(|aborted| *aborted).await.is_ok() {
                return;
            }
        }
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_abort_wakes_waiter() {
        let handle = AbortHandle::new();
        let mut signal = handle.signal();

        let waiter = tokio::spawn(async move { signal.aborted().await });
        handle.abort();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_abort_before_wait() {
        let handle = AbortHandle::new();
        handle.abort();
        let mut signal = handle.signal();
        tokio::time::timeout(Duration::from_secs(1), signal.aborted())
            .await
            .unwrap();
        assert!(handle.is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_signal_pends() {
        let mut signal = AbortSignal::never();
        let result = tokio::time::timeout(Duration::from_secs(5), signal.aborted()).await;
        assert!(result.is_err());
        assert!(!signal.is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_pends() {
        let mut signal = AbortHandle::new().signal();
        let result = tokio::time::timeout(Duration::from_secs(5), signal.aborted()).await;
        assert!(result.is_err());
    }
}
