//! Cooperative, fire-once cancellation.
//!
//! An [`AbortController`] owns the right to abort; any number of cloned
//! [`AbortSignal`]s observe it. Aborting is advisory: nothing is interrupted,
//! code holding a signal has to check it or register a listener.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

type Listener = Box<dyn FnOnce(&str) + Send>;

#[derive(Default)]
struct AbortState {
    reason: Option<String>,
    listeners: Vec<Listener>,
}

/// Creates and triggers an [`AbortSignal`].
#[derive(Debug, Clone, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle observing this controller.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Abort with the default reason.
    ///
    /// Returns `true` only for the call that actually aborted; later calls
    /// are no-ops and return `false`.
    pub fn abort(&self) -> bool {
        self.abort_with("The operation was aborted.")
    }

    pub fn abort_with(&self, reason: impl Into<String>) -> bool {
        self.signal.trigger(reason.into())
    }
}

/// Observer side of an [`AbortController`].
#[derive(Clone, Default)]
pub struct AbortSignal {
    token: CancellationToken,
    state: Arc<Mutex<AbortState>>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn reason(&self) -> Option<String> {
        self.lock().reason.clone()
    }

    /// Register a listener that runs once, when the signal aborts.
    ///
    /// Listeners added after the abort never run. Returns `false` in that
    /// case, so checking and registering happen under one lock:
    ///
    /// ```
    /// # use bocchi::abort::AbortController;
    /// let controller = AbortController::new();
    /// controller.abort();
    /// if !controller.signal().on_abort(|_| {}) {
    ///     // already aborted
    /// }
    /// ```
    pub fn on_abort<F>(&self, listener: F) -> bool
    where
        F: FnOnce(&str) + Send + 'static,
    {
        let mut state = self.lock();
        if state.reason.is_some() {
            return false;
        }
        state.listeners.push(Box::new(listener));
        true
    }

    /// Number of listeners waiting for the abort.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Resolves once the signal is aborted.
    pub async fn aborted(&self) {
        self.token.cancelled().await;
    }

    /// Whether both handles observe the same controller.
    pub fn same_as(&self, other: &AbortSignal) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn trigger(&self, reason: String) -> bool {
        let listeners = {
            let mut state = self.lock();
            if state.reason.is_some() {
                return false;
            }
            state.reason = Some(reason.clone());
            // `is_aborted` must agree with `reason` once the lock is released.
            self.token.cancel();
            std::mem::take(&mut state.listeners)
        };

        tracing::debug!(%reason, listeners = listeners.len(), "abort signalled");
        for listener in listeners {
            listener(&reason);
        }
        true
    }

    // Listeners run outside the lock.
    fn lock(&self) -> std::sync::MutexGuard<'_, AbortState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_abort_fires_listeners_once() {
        let controller = AbortController::new();
        let signal = controller.signal();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        signal.on_abort(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!signal.is_aborted());
        assert!(controller.abort());
        assert!(!controller.abort());

        assert!(signal.is_aborted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_reason_wins() {
        let controller = AbortController::new();
        controller.abort_with("unmounted");
        controller.abort_with("second");

        assert_eq!(controller.signal().reason().as_deref(), Some("unmounted"));
    }

    #[test]
    fn test_listener_added_after_abort_never_runs() {
        let controller = AbortController::new();
        controller.abort();

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registered = controller.signal().on_abort(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!registered);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.signal().listener_count(), 0);
    }

    #[test]
    fn test_abort_from_other_thread_never_loses_listener() {
        for _ in 0..2000 {
            let controller = AbortController::new();
            let signal = controller.signal();
            let calls = Arc::new(AtomicUsize::new(0));

            let aborter = std::thread::spawn(move || controller.abort());

            let counter = calls.clone();
            let registered = signal.on_abort(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
            assert!(aborter.join().unwrap());

            assert!(signal.is_aborted());
            let expected = if registered { 1 } else { 0 };
            assert_eq!(calls.load(Ordering::SeqCst), expected);
        }
    }

    #[test]
    fn test_reason_set_means_aborted() {
        for _ in 0..2000 {
            let controller = AbortController::new();
            let signal = controller.signal();

            let aborter = std::thread::spawn(move || controller.abort());
            while signal.reason().is_none() {
                std::hint::spin_loop();
            }
            assert!(signal.is_aborted());
            aborter.join().unwrap();
        }
    }

    #[test]
    fn test_same_as() {
        let a = AbortController::new();
        let b = AbortController::new();

        assert!(a.signal().same_as(&a.signal()));
        assert!(!a.signal().same_as(&b.signal()));
    }

    #[tokio::test]
    async fn test_aborted_future_resolves() {
        let controller = AbortController::new();
        let signal = controller.signal();

        let waiter = tokio::spawn(async move {
            signal.aborted().await;
            signal.reason()
        });

        controller.abort_with("done");
        assert_eq!(waiter.await.unwrap().as_deref(), Some("done"));
    }
}
