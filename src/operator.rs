//! The operator that plugs a breaker gate into a one-shot producer.

use std::error::Error;
use std::sync::Arc;

use crate::error::BreakerError;
use crate::gate::BreakerGate;
use crate::maybe::{Cancellation, MaybeObserver, MaybeSource};
use crate::subscription::Subscription;

/// Wraps one-shot producers so that every subscription is mediated by a
/// breaker gate.
///
/// The operator itself is cheap and reusable: it holds nothing but a
/// reference to the gate and can be applied to any number of pipelines.
pub struct CircuitBreakerOperator {
    gate: Arc<dyn BreakerGate>,
}

impl CircuitBreakerOperator {
    /// Creates an operator backed by `gate`.
    pub fn of(gate: Arc<dyn BreakerGate>) -> Self {
        Self { gate }
    }

    /// Wraps `upstream` in a producer whose subscriptions acquire a permit
    /// before the upstream runs and report their outcome back to the gate.
    pub fn apply<T, E>(&self, upstream: Arc<dyn MaybeSource<T, E>>) -> BreakerMaybe<T, E>
    where
        T: Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
    {
        BreakerMaybe {
            gate: Arc::clone(&self.gate),
            upstream,
        }
    }
}

/// A one-shot producer guarded by a breaker gate.
///
/// Per subscription: the downstream is given its cancel token, then a permit
/// is requested. A denied permit settles the subscription with
/// [`BreakerError::NotPermitted`] without ever subscribing upstream. A
/// granted permit is settled exactly once, by the first terminal event or by
/// cancellation.
pub struct BreakerMaybe<T, E> {
    gate: Arc<dyn BreakerGate>,
    upstream: Arc<dyn MaybeSource<T, E>>,
}

impl<T, E> MaybeSource<T, BreakerError<E>> for BreakerMaybe<T, E>
where
    T: Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, BreakerError<E>>>) {
        let subscription = Arc::new(Subscription::new(
            Arc::clone(&observer),
            Arc::clone(&self.gate),
        ));
        observer.on_subscribe(Arc::clone(&subscription) as Arc<dyn Cancellation>);

        if !self.gate.try_acquire_permission() {
            subscription.deny();
            return;
        }

        if !subscription.arm(self.gate.current_timestamp()) {
            // Cancelled between the subscribed signal and the permit check;
            // the permit was granted but nobody will report for it.
            self.gate.release_permission();
            return;
        }

        self.upstream.subscribe(subscription);
    }
}
