//! # maybebreaker-rs
//!
//! A circuit-breaker operator for one-shot asynchronous producers.
//!
//! A one-shot producer (a "maybe") is a cold computation that, once
//! subscribed, delivers exactly one of {value, empty completion, error} and
//! can be cancelled. This crate couples such producers to a permit-issuing
//! circuit breaker: each subscription first asks the breaker for a permit,
//! and the outcome of the call is reported back so the breaker can learn.
//!
//! ## Permit accounting
//!
//! Every granted permit is settled with the breaker exactly once:
//!
//! - a produced value reports `on_result`,
//! - an empty completion reports `on_success`,
//! - a failure reports `on_error`,
//! - a cancellation before any terminal event calls `release_permission`.
//!
//! A denied permit settles the subscription with [`CallNotPermitted`] and
//! never touches the breaker again. Races between a late upstream terminal
//! and a downstream cancel are decided by a compare-and-set, so exactly one
//! of the four settlements happens.
//!
//! ## Basic Usage
//!
//! ```rust
//! use maybebreaker_rs::{
//!     maybe, BreakerError, Cancellation, CircuitBreaker, CircuitBreakerOperator,
//!     MaybeObserver, MaybeSource,
//! };
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl MaybeObserver<i32, BreakerError<std::io::Error>> for Printer {
//!     fn on_subscribe(&self, _cancel: Arc<dyn Cancellation>) {}
//!
//!     fn on_value(&self, value: i32) {
//!         println!("value: {}", value);
//!     }
//!
//!     fn on_complete(&self) {
//!         println!("completed empty");
//!     }
//!
//!     fn on_error(&self, error: BreakerError<std::io::Error>) {
//!         println!("failed: {}", error);
//!     }
//! }
//!
//! let breaker = Arc::new(CircuitBreaker::builder().name("lookup").build());
//! let operator = CircuitBreakerOperator::of(breaker);
//!
//! let guarded = operator.apply::<i32, std::io::Error>(Arc::new(maybe::just(1)));
//! guarded.subscribe(Arc::new(Printer));
//! ```
//!
//! ## Async Support
//!
//! With the `async` feature enabled, [`FutureMaybe`] adapts a future factory
//! into a source; cancelling the subscription aborts the spawned task.
//!
//! ## Features
//!
//! - `std` - Standard library support (default)
//! - `async` - Tokio-backed future sources
//!
//! [`FutureMaybe`]: crate::FutureMaybe

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod breaker;
mod config;
mod error;
#[cfg(feature = "async")]
mod future;
mod gate;
mod hook;
pub mod maybe;
mod operator;
pub mod prelude;
mod subscription;

// Re-exports
pub use breaker::{CircuitBreaker, State};
pub use config::BreakerBuilder;
pub use error::{BreakerError, CallNotPermitted};
#[cfg(feature = "async")]
pub use future::FutureMaybe;
pub use gate::{BreakerGate, TimeUnit};
pub use hook::{reset_uncaught_error_hook, set_uncaught_error_hook};
pub use maybe::{CancelFlag, Cancellation, MaybeObserver, MaybeSource};
pub use operator::{BreakerMaybe, CircuitBreakerOperator};
