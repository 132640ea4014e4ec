//! Re-exports the types needed to compose a guarded pipeline.
//!
//! # Example
//! ```rust,no_run
//! use maybebreaker_rs::prelude::*;
//! ```

pub use crate::breaker::{CircuitBreaker, State};
pub use crate::error::{BreakerError, CallNotPermitted};
pub use crate::gate::{BreakerGate, TimeUnit};
pub use crate::maybe::{CancelFlag, Cancellation, MaybeObserver, MaybeSource};
pub use crate::operator::{BreakerMaybe, CircuitBreakerOperator};
