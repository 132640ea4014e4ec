//! Error types for guarded subscriptions.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Error delivered downstream by a guarded subscription.
#[derive(Debug)]
pub enum BreakerError<E> {
    /// The breaker denied the permit; the upstream was never subscribed.
    NotPermitted(CallNotPermitted),

    /// The upstream producer failed.
    Operation(E),
}

/// Synthetic error signalling that the breaker denied the permit.
#[derive(Debug)]
pub struct CallNotPermitted {
    breaker: String,
}

impl CallNotPermitted {
    pub(crate) fn new(breaker: &str) -> Self {
        Self {
            breaker: breaker.to_string(),
        }
    }

    /// The name of the breaker that denied the permit.
    pub fn breaker_name(&self) -> &str {
        &self.breaker
    }
}

impl<E> Display for BreakerError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BreakerError::NotPermitted(e) => write!(f, "{}", e),
            BreakerError::Operation(e) => write!(f, "Operation error: {}", e),
        }
    }
}

impl Display for CallNotPermitted {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circuit breaker '{}' does not permit further calls",
            self.breaker
        )
    }
}

impl<E: Error + 'static> Error for BreakerError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BreakerError::NotPermitted(_) => None,
            BreakerError::Operation(e) => Some(e),
        }
    }
}

impl Error for CallNotPermitted {}
