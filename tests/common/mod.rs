#![allow(dead_code)]

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use maybebreaker_rs::{BreakerGate, CancelFlag, Cancellation, MaybeObserver, MaybeSource, TimeUnit};

// Custom error type that implements Error trait
#[derive(Debug)]
pub struct TestError(String);

impl TestError {
    pub fn new(msg: &str) -> Self {
        TestError(msg.to_string())
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test error: {}", self.0)
    }
}

impl Error for TestError {}

/// A stub gate with a scriptable permit decision and a manually driven clock.
pub struct RecordingGate {
    permitted: AtomicBool,
    now: AtomicU64,
    acquire_calls: AtomicUsize,
    result_calls: AtomicUsize,
    success_calls: AtomicUsize,
    error_calls: AtomicUsize,
    release_calls: AtomicUsize,
    last_elapsed: AtomicU64,
    last_unit: Mutex<Option<TimeUnit>>,
    last_result: Mutex<Option<i32>>,
    last_error: Mutex<Option<String>>,
}

impl RecordingGate {
    pub fn new(permitted: bool) -> Self {
        Self {
            permitted: AtomicBool::new(permitted),
            now: AtomicU64::new(0),
            acquire_calls: AtomicUsize::new(0),
            result_calls: AtomicUsize::new(0),
            success_calls: AtomicUsize::new(0),
            error_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
            last_elapsed: AtomicU64::new(0),
            last_unit: Mutex::new(None),
            last_result: Mutex::new(None),
            last_error: Mutex::new(None),
        }
    }

    pub fn set_now(&self, ticks: u64) {
        self.now.store(ticks, Ordering::SeqCst);
    }

    pub fn acquire_calls(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    pub fn result_calls(&self) -> usize {
        self.result_calls.load(Ordering::SeqCst)
    }

    pub fn success_calls(&self) -> usize {
        self.success_calls.load(Ordering::SeqCst)
    }

    pub fn error_calls(&self) -> usize {
        self.error_calls.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn report_total(&self) -> usize {
        self.result_calls() + self.success_calls() + self.error_calls() + self.release_calls()
    }

    pub fn last_elapsed(&self) -> u64 {
        self.last_elapsed.load(Ordering::SeqCst)
    }

    pub fn last_unit(&self) -> Option<TimeUnit> {
        *self.last_unit.lock()
    }

    pub fn last_result(&self) -> Option<i32> {
        *self.last_result.lock()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl BreakerGate for RecordingGate {
    fn name(&self) -> &str {
        "test-breaker"
    }

    fn try_acquire_permission(&self) -> bool {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        self.permitted.load(Ordering::SeqCst)
    }

    fn release_permission(&self) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn on_result(&self, elapsed: u64, unit: TimeUnit, value: &dyn Any) {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        self.last_elapsed.store(elapsed, Ordering::SeqCst);
        *self.last_unit.lock() = Some(unit);
        if let Some(value) = value.downcast_ref::<i32>() {
            *self.last_result.lock() = Some(*value);
        }
    }

    fn on_success(&self, elapsed: u64, unit: TimeUnit) {
        self.success_calls.fetch_add(1, Ordering::SeqCst);
        self.last_elapsed.store(elapsed, Ordering::SeqCst);
        *self.last_unit.lock() = Some(unit);
    }

    fn on_error(&self, elapsed: u64, unit: TimeUnit, error: &(dyn Error + 'static)) {
        self.error_calls.fetch_add(1, Ordering::SeqCst);
        self.last_elapsed.store(elapsed, Ordering::SeqCst);
        *self.last_unit.lock() = Some(unit);
        *self.last_error.lock() = Some(error.to_string());
    }

    fn current_timestamp(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn timestamp_unit(&self) -> TimeUnit {
        TimeUnit::Nanos
    }
}

/// Records every downstream signal of one subscription.
pub struct RecordingObserver<T, E> {
    subscribed: AtomicBool,
    token: Mutex<Option<Arc<dyn Cancellation>>>,
    values: Mutex<Vec<T>>,
    completed: AtomicBool,
    error: Mutex<Option<E>>,
    terminal: AtomicUsize,
}

impl<T, E> RecordingObserver<T, E> {
    pub fn new() -> Self {
        Self {
            subscribed: AtomicBool::new(false),
            token: Mutex::new(None),
            values: Mutex::new(Vec::new()),
            completed: AtomicBool::new(false),
            error: Mutex::new(None),
            terminal: AtomicUsize::new(0),
        }
    }

    /// Cancels through the token received at subscribe time.
    pub fn cancel(&self) {
        let token = self.token.lock().clone();
        if let Some(token) = token {
            token.cancel();
        }
    }

    pub fn subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal.load(Ordering::SeqCst)
    }

    pub fn error(&self) -> parking_lot::MutexGuard<'_, Option<E>> {
        self.error.lock()
    }
}

impl<T: Clone, E> RecordingObserver<T, E> {
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}

impl<T, E> MaybeObserver<T, E> for RecordingObserver<T, E>
where
    T: Send + Sync,
    E: Send + Sync,
{
    fn on_subscribe(&self, cancel: Arc<dyn Cancellation>) {
        self.subscribed.store(true, Ordering::SeqCst);
        *self.token.lock() = Some(cancel);
    }

    fn on_value(&self, value: T) {
        self.values.lock().push(value);
        self.completed.store(true, Ordering::SeqCst);
        self.terminal.fetch_add(1, Ordering::SeqCst);
    }

    fn on_complete(&self) {
        self.completed.store(true, Ordering::SeqCst);
        self.terminal.fetch_add(1, Ordering::SeqCst);
    }

    fn on_error(&self, error: E) {
        *self.error.lock() = Some(error);
        self.terminal.fetch_add(1, Ordering::SeqCst);
    }
}

/// A source driven by the test after subscription, for late and racing
/// terminal events.
pub struct ManualSource<T, E> {
    observer: Mutex<Option<Arc<dyn MaybeObserver<T, E>>>>,
    cancel_flag: Mutex<Option<Arc<CancelFlag>>>,
}

impl<T, E> ManualSource<T, E> {
    pub fn new() -> Self {
        Self {
            observer: Mutex::new(None),
            cancel_flag: Mutex::new(None),
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.observer.lock().is_some()
    }

    pub fn upstream_cancelled(&self) -> bool {
        self.cancel_flag
            .lock()
            .as_ref()
            .map(|flag| flag.is_cancelled())
            .unwrap_or(false)
    }

    pub fn push_value(&self, value: T) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.on_value(value);
        }
    }

    pub fn push_complete(&self) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.on_complete();
        }
    }

    pub fn push_error(&self, error: E) {
        let observer = self.observer.lock().clone();
        if let Some(observer) = observer {
            observer.on_error(error);
        }
    }
}

impl<T, E> MaybeSource<T, E> for ManualSource<T, E> {
    fn subscribe(&self, observer: Arc<dyn MaybeObserver<T, E>>) {
        let flag = Arc::new(CancelFlag::new());
        observer.on_subscribe(flag.clone());
        *self.cancel_flag.lock() = Some(flag);
        *self.observer.lock() = Some(observer);
    }
}
