//! # Callback Style
//!
//! Runs a request on the tokio runtime and reports the outcome to a
//! [`Callback`]. The returned [`CancellableTask`] can suppress delivery.
//!
//! Cancellation is best effort at the transport level: the spawned task is
//! aborted, but a request already written to the socket is not recalled.
//! What is guaranteed is that once `cancel()` returns `true`, neither
//! `on_success` nor `on_failure` will run.

use crate::error::{BuyError, BuyResult};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Receives the outcome of a callback-style call.
///
/// Any `FnOnce(BuyResult<T>)` closure is a callback. Use [`from_fns`] to
/// supply separate success and failure closures.
pub trait Callback<T>: Send + 'static {
    fn on_success(self, value: T);
    fn on_failure(self, error: BuyError);
}

impl<T, F> Callback<T> for F
where
    F: FnOnce(BuyResult<T>) + Send + 'static,
{
    fn on_success(self, value: T) {
        self(Ok(value))
    }

    fn on_failure(self, error: BuyError) {
        self(Err(error))
    }
}

/// Callback built from a success closure and a failure closure
pub struct SplitCallback<S, F> {
    success: S,
    failure: F,
}

/// Build a callback from separate success and failure closures
pub fn from_fns<T, S, F>(success: S, failure: F) -> SplitCallback<S, F>
where
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(BuyError) + Send + 'static,
{
    SplitCallback { success, failure }
}

impl<T, S, F> Callback<T> for SplitCallback<S, F>
where
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(BuyError) + Send + 'static,
{
    fn on_success(self, value: T) {
        (self.success)(value)
    }

    fn on_failure(self, error: BuyError) {
        (self.failure)(error)
    }
}

const PENDING: u8 = 0;
const DELIVERED: u8 = 1;
const CANCELLED: u8 = 2;

/// Handle to an in-flight callback-style call.
///
/// Dropping the handle does not cancel the call; the callback still fires.
#[derive(Debug)]
pub struct CancellableTask {
    slot: Arc<AtomicU8>,
    handle: JoinHandle<()>,
}

impl CancellableTask {
    /// Spawn `future` on `runtime` and hand its result to `callback`
    pub fn spawn<T, Fut, C>(runtime: &Handle, future: Fut, callback: C) -> Self
    where
        T: Send + 'static,
        Fut: Future<Output = BuyResult<T>> + Send + 'static,
        C: Callback<T>,
    {
        let slot = Arc::new(AtomicU8::new(PENDING));
        let delivery = Arc::clone(&slot);

        let handle = runtime.spawn(async move {
            let result = future.await;

            // Whoever moves the slot out of PENDING first wins
            if delivery
                .compare_exchange(PENDING, DELIVERED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                debug!("Task was cancelled, dropping result");
                return;
            }

            match result {
                Ok(value) => callback.on_success(value),
                Err(error) => callback.on_failure(error),
            }
        });

        Self { slot, handle }
    }

    /// Suppress delivery of the result.
    ///
    /// Returns `true` if delivery was suppressed, `false` if the callback
    /// already ran (or is running).
    pub fn cancel(&self) -> bool {
        let suppressed = self
            .slot
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if suppressed {
            self.handle.abort();
        }
        suppressed
    }

    pub fn is_cancelled(&self) -> bool {
        self.slot.load(Ordering::Acquire) == CANCELLED
    }

    /// True once the spawned task has ended, whether delivered or aborted
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the spawned task to end
    pub async fn wait(self) {
        // An aborted task yields a JoinError, which is the expected outcome of cancel()
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_delivers_success() {
        let (tx, rx) = oneshot::channel();
        let task = CancellableTask::spawn(
            &Handle::current(),
            async { Ok::<_, BuyError>(42) },
            move |result: BuyResult<i32>| {
                let _ = tx.send(result);
            },
        );

        assert_eq!(rx.await.unwrap().unwrap(), 42);
        assert!(!task.cancel());
        assert!(!task.is_cancelled());
    }

    #[tokio::test]
    async fn test_delivers_failure_to_failure_closure() {
        let (tx, rx) = oneshot::channel();
        let _task = CancellableTask::spawn(
            &Handle::current(),
            async { Err::<i32, _>(BuyError::Transport("connection reset".into())) },
            from_fns(
                |_: i32| panic!("success must not fire"),
                move |error| {
                    let _ = tx.send(error);
                },
            ),
        );

        let error = rx.await.unwrap();
        assert!(matches!(error, BuyError::Transport(_)));
    }

    #[tokio::test]
    async fn test_cancel_suppresses_both_callbacks() {
        for outcome in [Ok(1), Err(BuyError::Transport("timeout".into()))] {
            let (release_tx, release_rx) = oneshot::channel::<()>();
            let fired = Arc::new(AtomicBool::new(false));
            let on_success = Arc::clone(&fired);
            let on_failure = Arc::clone(&fired);

            let task = CancellableTask::spawn(
                &Handle::current(),
                async move {
                    let _ = release_rx.await;
                    outcome
                },
                from_fns(
                    move |_: i32| on_success.store(true, Ordering::SeqCst),
                    move |_| on_failure.store(true, Ordering::SeqCst),
                ),
            );

            assert!(task.cancel());
            assert!(task.is_cancelled());
            let _ = release_tx.send(());
            task.wait().await;

            assert!(!fired.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn test_dropping_handle_keeps_delivery() {
        let (tx, rx) = oneshot::channel();
        drop(CancellableTask::spawn(
            &Handle::current(),
            async { Ok::<_, BuyError>("done") },
            move |result: BuyResult<&'static str>| {
                let _ = tx.send(result);
            },
        ));

        assert_eq!(rx.await.unwrap().unwrap(), "done");
    }
}
