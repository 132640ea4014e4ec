//! Configuration for circuit breakers.

use std::time::Duration;

use crate::breaker::CircuitBreaker;

/// Builder for creating circuit breakers with custom configurations.
pub struct BreakerBuilder {
    name: String,
    consecutive_failures: u32,
    consecutive_successes: u32,
    cooldown: Duration,
    half_open_probes: u32,
}

impl Default for BreakerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            name: "circuit-breaker".to_string(),
            consecutive_failures: 5,
            consecutive_successes: 1,
            cooldown: Duration::from_secs(30),
            half_open_probes: 3,
        }
    }

    /// Sets the breaker name carried by permit-denial errors.
    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Sets the number of consecutive failures required to trip the circuit.
    pub fn consecutive_failures(mut self, count: u32) -> Self {
        self.consecutive_failures = count;
        self
    }

    /// Sets the number of consecutive successes required to close the
    /// circuit from half-open.
    pub fn consecutive_successes(mut self, count: u32) -> Self {
        self.consecutive_successes = count;
        self
    }

    /// Sets the cooldown duration before the circuit transitions from open
    /// to half-open.
    pub fn cooldown(mut self, duration: Duration) -> Self {
        self.cooldown = duration;
        self
    }

    /// Sets the number of probe permits granted in the half-open state.
    pub fn half_open_probes(mut self, count: u32) -> Self {
        self.half_open_probes = count;
        self
    }

    /// Builds a new circuit breaker with the configured settings.
    pub fn build(self) -> CircuitBreaker {
        CircuitBreaker::new(
            self.name,
            self.consecutive_failures.max(1),
            self.consecutive_successes.max(1),
            self.cooldown,
            self.half_open_probes.max(1),
        )
    }
}
