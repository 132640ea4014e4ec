//! Bridges standard futures into the one-shot subscription protocol.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::maybe::{Cancellation, MaybeObserver, MaybeSource};

type FutureFactory<T, E> =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Option<T>, E>> + Send + Sync>;

/// A cold source backed by a future factory.
///
/// Each subscription spawns a fresh future on the ambient tokio runtime.
/// `Ok(Some(v))` becomes a value, `Ok(None)` an empty completion, `Err(e)` an
/// error. Cancelling the subscription aborts the task.
pub struct FutureMaybe<T, E> {
    factory: FutureFactory<T, E>,
}

impl<T, E> FutureMaybe<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Creates a source that runs a future from `factory` per subscription.
    pub fn new<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<T>, E>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || Box::pin(factory())),
        }
    }
}

struct TaskCancellation {
    cancelled: AtomicBool,
    task: Mutex<Option<AbortHandle>>,
}

impl Cancellation for TaskCancellation {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

impl<T, E> MaybeSource<T, E> for FutureMaybe<T, E>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>) {
        let cancellation = Arc::new(TaskCancellation {
            cancelled: AtomicBool::new(false),
            task: Mutex::new(None),
        });
        observer.on_subscribe(cancellation.clone());

        if cancellation.cancelled.load(Ordering::Acquire) {
            return;
        }

        let fut = (self.factory)();
        let downstream = observer;
        let handle = tokio::spawn(async move {
            match fut.await {
                Ok(Some(value)) => downstream.on_value(value),
                Ok(None) => downstream.on_complete(),
                Err(error) => downstream.on_error(error),
            }
        });

        // Store the abort handle unless a cancel raced in while spawning.
        let abort = handle.abort_handle();
        let mut slot = cancellation.task.lock();
        if cancellation.cancelled.load(Ordering::Acquire) {
            abort.abort();
        } else {
            *slot = Some(abort);
        }
    }
}
