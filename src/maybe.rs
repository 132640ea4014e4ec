//! The one-shot subscription protocol and stock sources.
//!
//! A "maybe" is a cold producer: each call to [`MaybeSource::subscribe`] runs
//! the computation once and delivers exactly one terminal signal to the
//! observer. The observer always receives `on_subscribe` first, carrying a
//! token it can use to cancel the subscription.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A handle that cancels one subscription.
///
/// `cancel` is idempotent; calls after the first are no-ops.
pub trait Cancellation: Send + Sync {
    /// Cancels the subscription this token belongs to.
    fn cancel(&self);
}

/// A plain atomic-flag [`Cancellation`], handed out by the stock sources.
pub struct CancelFlag {
    cancelled: AtomicBool,
}

impl CancelFlag {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation for CancelFlag {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

/// Receives the lifecycle signals of one subscription.
///
/// Exactly one of the terminal signals (`on_value`, `on_complete`,
/// `on_error`) is delivered per subscription, always after `on_subscribe`.
pub trait MaybeObserver<T, E>: Send + Sync {
    /// The subscription started; `cancel` aborts it.
    fn on_subscribe(&self, cancel: Arc<dyn Cancellation>);

    /// The producer yielded a value. Terminal: a value implies completion,
    /// no further signal follows.
    fn on_value(&self, value: T);

    /// The producer completed without a value. Terminal.
    fn on_complete(&self);

    /// The producer failed. Terminal.
    fn on_error(&self, error: E);
}

/// A cold producer of at most one value.
pub trait MaybeSource<T, E>: Send + Sync {
    /// Runs the computation once for this observer.
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>);
}

/// Creates a source that yields a clone of `value` to every subscriber.
pub fn just<T>(value: T) -> Just<T> {
    Just { value }
}

/// Creates a source that completes without a value.
pub fn empty() -> Empty {
    Empty
}

/// Creates a source that fails every subscriber with a fresh error from
/// `factory`.
pub fn error<E, F>(factory: F) -> Fail<F>
where
    F: Fn() -> E + Send + Sync,
{
    Fail { factory }
}

/// Creates a source that never reaches a terminal event.
pub fn never() -> Never {
    Never
}

/// Source returned by [`just`].
pub struct Just<T> {
    value: T,
}

impl<T, E> MaybeSource<T, E> for Just<T>
where
    T: Clone + Send + Sync,
{
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>) {
        let cancel = Arc::new(CancelFlag::new());
        observer.on_subscribe(cancel.clone());

        if !cancel.is_cancelled() {
            observer.on_value(self.value.clone());
        }
    }
}

/// Source returned by [`empty`].
pub struct Empty;

impl<T, E> MaybeSource<T, E> for Empty {
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>) {
        let cancel = Arc::new(CancelFlag::new());
        observer.on_subscribe(cancel.clone());

        if !cancel.is_cancelled() {
            observer.on_complete();
        }
    }
}

/// Source returned by [`error`].
pub struct Fail<F> {
    factory: F,
}

impl<T, E, F> MaybeSource<T, E> for Fail<F>
where
    F: Fn() -> E + Send + Sync,
{
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>) {
        let cancel = Arc::new(CancelFlag::new());
        observer.on_subscribe(cancel.clone());

        if !cancel.is_cancelled() {
            observer.on_error((self.factory)());
        }
    }
}

/// Source returned by [`never`].
pub struct Never;

impl<T, E> MaybeSource<T, E> for Never {
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>) {
        observer.on_subscribe(Arc::new(CancelFlag::new()));
    }
}
