//! A concrete permit-issuing circuit breaker.

use std::any::Any;
use std::error::Error;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::BreakerBuilder;
use crate::gate::{BreakerGate, TimeUnit};

/// Represents the possible states of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Circuit is closed and permits are granted.
    Closed = 0,

    /// Circuit is open and permits are denied.
    Open = 1,

    /// Circuit grants a limited number of probe permits to test recovery.
    HalfOpen = 2,
}

impl From<u8> for State {
    fn from(value: u8) -> Self {
        match value {
            0 => State::Closed,
            1 => State::Open,
            2 => State::HalfOpen,
            _ => State::Closed, // Default to closed for invalid values
        }
    }
}

/// A circuit breaker that grants permits and learns from reported outcomes.
///
/// Trips open after a configurable number of consecutive failures, cools
/// down, then admits a bounded number of half-open probes. Probe permits that
/// are released without an outcome become available again.
///
/// The breaker doubles as the clock for the calls it guards: timestamps are
/// monotonic nanoseconds since the breaker was built.
pub struct CircuitBreaker {
    name: String,
    state: AtomicU8,
    last_transition: Mutex<Instant>,
    consecutive_failures: AtomicU32,
    consecutive_successes: AtomicU32,
    failure_threshold: u32,
    success_threshold: u32,
    cooldown: Duration,
    half_open_probes: AtomicU32,
    half_open_max: u32,
    epoch: Instant,
}

impl CircuitBreaker {
    pub(crate) fn new(
        name: String,
        failure_threshold: u32,
        success_threshold: u32,
        cooldown: Duration,
        half_open_max: u32,
    ) -> Self {
        Self {
            name,
            state: AtomicU8::new(State::Closed as u8),
            last_transition: Mutex::new(Instant::now()),
            consecutive_failures: AtomicU32::new(0),
            consecutive_successes: AtomicU32::new(0),
            failure_threshold,
            success_threshold,
            cooldown,
            half_open_probes: AtomicU32::new(0),
            half_open_max,
            epoch: Instant::now(),
        }
    }

    /// Creates a new builder for customizing a circuit breaker.
    pub fn builder() -> BreakerBuilder {
        BreakerBuilder::new()
    }

    /// Gets the current state of the circuit breaker.
    pub fn current_state(&self) -> State {
        State::from(self.state.load(Ordering::Acquire))
    }

    /// Forces the breaker to the open state. Returns false if it was already
    /// open.
    pub fn force_open(&self) -> bool {
        let current = self.current_state();
        if current == State::Open {
            return false;
        }

        self.transition(current, State::Open)
    }

    /// Forces the breaker back to the closed state. Returns false if it was
    /// already closed.
    pub fn force_closed(&self) -> bool {
        let current = self.current_state();
        if current == State::Closed {
            return false;
        }

        if self.transition(current, State::Closed) {
            self.consecutive_failures.store(0, Ordering::Relaxed);
            self.consecutive_successes.store(0, Ordering::Relaxed);
            return true;
        }

        false
    }

    fn transition(&self, from: State, to: State) -> bool {
        let result = self
            .state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if result {
            *self.last_transition.lock() = Instant::now();
        }

        result
    }

    fn time_in_state(&self) -> Duration {
        self.last_transition.lock().elapsed()
    }

    fn take_probe(&self) -> bool {
        self.half_open_probes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |probes| {
                probes.checked_sub(1)
            })
            .is_ok()
    }

    fn record_success(&self) {
        self.consecutive_failures.store(0, Ordering::Relaxed);
        let successes = self.consecutive_successes.fetch_add(1, Ordering::AcqRel) + 1;

        if self.current_state() == State::HalfOpen
            && successes >= self.success_threshold
            && self.transition(State::HalfOpen, State::Closed)
        {
            self.consecutive_successes.store(0, Ordering::Relaxed);
        }
    }

    fn record_failure(&self) {
        self.consecutive_successes.store(0, Ordering::Relaxed);
        let failures = self.consecutive_failures.fetch_add(1, Ordering::AcqRel) + 1;

        match self.current_state() {
            State::HalfOpen => {
                // A failed probe reopens the circuit immediately.
                self.transition(State::HalfOpen, State::Open);
            }
            State::Closed => {
                if failures >= self.failure_threshold {
                    self.transition(State::Closed, State::Open);
                }
            }
            State::Open => {}
        }
    }
}

impl BreakerGate for CircuitBreaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn try_acquire_permission(&self) -> bool {
        match self.current_state() {
            State::Closed => true,
            State::Open => {
                if self.time_in_state() >= self.cooldown
                    && self.transition(State::Open, State::HalfOpen)
                {
                    self.half_open_probes
                        .store(self.half_open_max, Ordering::Release);
                    self.take_probe()
                } else {
                    false
                }
            }
            State::HalfOpen => self.take_probe(),
        }
    }

    fn release_permission(&self) {
        // Only half-open probes are counted; a released probe slot becomes
        // available to the next caller.
        if self.current_state() == State::HalfOpen {
            self.half_open_probes.fetch_add(1, Ordering::AcqRel);
        }
    }

    fn on_result(&self, _elapsed: u64, _unit: TimeUnit, _value: &dyn Any) {
        // Every produced value counts as a success; result classification is
        // left to gates that inspect the value.
        self.record_success();
    }

    fn on_success(&self, _elapsed: u64, _unit: TimeUnit) {
        self.record_success();
    }

    fn on_error(&self, _elapsed: u64, _unit: TimeUnit, _error: &(dyn Error + 'static)) {
        self.record_failure();
    }

    fn current_timestamp(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn timestamp_unit(&self) -> TimeUnit {
        TimeUnit::Nanos
    }
}
