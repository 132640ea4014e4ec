//! The decision gate consumed by the operator.

use std::any::Any;
use std::error::Error;
use std::time::Duration;

/// Units for the timestamps handed out by a [`BreakerGate`] clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// Nanoseconds.
    Nanos,

    /// Microseconds.
    Micros,

    /// Milliseconds.
    Millis,

    /// Seconds.
    Secs,
}

impl TimeUnit {
    /// Converts a tick count in this unit into a [`Duration`].
    pub fn to_duration(self, ticks: u64) -> Duration {
        match self {
            TimeUnit::Nanos => Duration::from_nanos(ticks),
            TimeUnit::Micros => Duration::from_micros(ticks),
            TimeUnit::Millis => Duration::from_millis(ticks),
            TimeUnit::Secs => Duration::from_secs(ticks),
        }
    }
}

/// A permit-issuing circuit breaker, shared across subscriptions.
///
/// Every permit obtained through [`try_acquire_permission`] must be returned
/// exactly once, through exactly one of [`on_result`], [`on_success`],
/// [`on_error`] or [`release_permission`]. When the permit was denied, none
/// of those methods may be called for that attempt.
///
/// Implementations must be thread-safe; the operator invokes the gate from
/// whichever thread delivers the upstream or downstream signal.
///
/// [`try_acquire_permission`]: BreakerGate::try_acquire_permission
/// [`on_result`]: BreakerGate::on_result
/// [`on_success`]: BreakerGate::on_success
/// [`on_error`]: BreakerGate::on_error
/// [`release_permission`]: BreakerGate::release_permission
pub trait BreakerGate: Send + Sync + 'static {
    /// The breaker's name, carried by [`CallNotPermitted`] for diagnostics.
    ///
    /// [`CallNotPermitted`]: crate::CallNotPermitted
    fn name(&self) -> &str;

    /// Requests a permit for one call. Non-blocking.
    fn try_acquire_permission(&self) -> bool;

    /// Returns a permit that was acquired but never used, because the call
    /// was cancelled before any terminal event.
    fn release_permission(&self);

    /// Records a call that produced a value, together with the elapsed time
    /// measured on this gate's clock.
    fn on_result(&self, elapsed: u64, unit: TimeUnit, value: &dyn Any);

    /// Records a call that completed without producing a value.
    fn on_success(&self, elapsed: u64, unit: TimeUnit);

    /// Records a failed call.
    fn on_error(&self, elapsed: u64, unit: TimeUnit, error: &(dyn Error + 'static));

    /// A monotonic timestamp in [`timestamp_unit`] units.
    ///
    /// [`timestamp_unit`]: BreakerGate::timestamp_unit
    fn current_timestamp(&self) -> u64;

    /// The unit of [`current_timestamp`].
    ///
    /// [`current_timestamp`]: BreakerGate::current_timestamp
    fn timestamp_unit(&self) -> TimeUnit;
}
