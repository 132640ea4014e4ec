//! Per-subscription state machine for the guarded producer.

use std::error::Error;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{BreakerError, CallNotPermitted};
use crate::gate::BreakerGate;
use crate::hook;
use crate::maybe::{Cancellation, MaybeObserver};

// Lifecycle of one subscription. All transitions go through CAS on `state`,
// so a late upstream terminal and a downstream cancel cannot both win.
const INIT: u8 = 0;
const RUNNING: u8 = 1;
const TERMINAL: u8 = 2;

/// Couples one downstream observer to one permit.
///
/// The handle plays two roles at once: it is the upstream's observer and the
/// downstream's cancel token. Whichever side reaches the terminal state first
/// settles the permit; everything that arrives afterwards is dropped, except
/// late errors, which go to the uncaught-error hook.
pub(crate) struct Subscription<T, E> {
    downstream: Arc<dyn MaybeObserver<T, BreakerError<E>>>,
    gate: Arc<dyn BreakerGate>,
    upstream: Mutex<Option<Arc<dyn Cancellation>>>,
    start: AtomicU64,
    state: AtomicU8,
}

impl<T, E> Subscription<T, E>
where
    T: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    pub(crate) fn new(
        downstream: Arc<dyn MaybeObserver<T, BreakerError<E>>>,
        gate: Arc<dyn BreakerGate>,
    ) -> Self {
        Self {
            downstream,
            gate,
            upstream: Mutex::new(None),
            start: AtomicU64::new(0),
            state: AtomicU8::new(INIT),
        }
    }

    /// Settles the subscription with `CallNotPermitted`. The gate is not
    /// touched again for this attempt.
    pub(crate) fn deny(&self) {
        if self
            .state
            .compare_exchange(INIT, TERMINAL, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            let denied = CallNotPermitted::new(self.gate.name());
            self.downstream.on_error(BreakerError::NotPermitted(denied));
        }
    }

    /// Records the start timestamp and moves INIT -> RUNNING.
    ///
    /// Returns false when the downstream cancelled before the permit check
    /// finished; the caller still holds the permit and must release it.
    pub(crate) fn arm(&self, start: u64) -> bool {
        self.start.store(start, Ordering::Release);
        self.state
            .compare_exchange(INIT, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn enter_terminal(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, TERMINAL, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn elapsed(&self) -> u64 {
        self.gate
            .current_timestamp()
            .saturating_sub(self.start.load(Ordering::Acquire))
    }
}

impl<T, E> MaybeObserver<T, E> for Subscription<T, E>
where
    T: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    fn on_subscribe(&self, cancel: Arc<dyn Cancellation>) {
        *self.upstream.lock() = Some(cancel);

        // The downstream may have cancelled while the upstream was handing
        // its token over. Idempotent cancel makes a double call harmless.
        if self.state.load(Ordering::Acquire) == TERMINAL {
            if let Some(upstream) = self.upstream.lock().take() {
                upstream.cancel();
            }
        }
    }

    fn on_value(&self, value: T) {
        if !self.enter_terminal() {
            return;
        }

        let elapsed = self.elapsed();
        self.gate
            .on_result(elapsed, self.gate.timestamp_unit(), &value);
        self.downstream.on_value(value);
    }

    fn on_complete(&self) {
        if !self.enter_terminal() {
            return;
        }

        let elapsed = self.elapsed();
        self.gate.on_success(elapsed, self.gate.timestamp_unit());
        self.downstream.on_complete();
    }

    fn on_error(&self, error: E) {
        if !self.enter_terminal() {
            hook::uncaught_error(&error);
            return;
        }

        let elapsed = self.elapsed();
        self.gate
            .on_error(elapsed, self.gate.timestamp_unit(), &error);
        self.downstream.on_error(BreakerError::Operation(error));
    }
}

impl<T, E> Cancellation for Subscription<T, E>
where
    T: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    fn cancel(&self) {
        // From RUNNING the permit is ours to return; from INIT no permit has
        // been granted yet, so only mark the subscription dead and let the
        // operator release the permit if it ends up acquiring one.
        if self.state.swap(TERMINAL, Ordering::AcqRel) == RUNNING {
            self.gate.release_permission();
            if let Some(upstream) = self.upstream.lock().take() {
                upstream.cancel();
            }
        }
    }
}
