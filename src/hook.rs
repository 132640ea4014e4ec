//! Process-global hook for errors that arrive after a terminal event.
//!
//! A subscription that has already reached its terminal state drops late
//! upstream signals, except errors: those are handed to the uncaught-error
//! hook so the host can log them. By default they are discarded.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::error::Error;
use std::sync::Arc;

type ErrorHookFn = Arc<dyn Fn(&(dyn Error + 'static)) + Send + Sync + 'static>;

static UNCAUGHT_HOOK: Lazy<RwLock<Option<ErrorHookFn>>> = Lazy::new(|| RwLock::new(None));

/// Installs the hook that receives errors arriving after a terminal event.
pub fn set_uncaught_error_hook<F>(hook: F)
where
    F: Fn(&(dyn Error + 'static)) + Send + Sync + 'static,
{
    *UNCAUGHT_HOOK.write() = Some(Arc::new(hook));
}

/// Removes the uncaught-error hook; late errors are discarded again.
pub fn reset_uncaught_error_hook() {
    *UNCAUGHT_HOOK.write() = None;
}

/// Routes a late error to the installed hook, if any.
pub(crate) fn uncaught_error(error: &(dyn Error + 'static)) {
    let hook = UNCAUGHT_HOOK.read().clone();
    if let Some(hook) = hook {
        hook(error);
    }
}
