//! Serialized execution host
//!
//! The contracts assume every call runs to completion before the next one
//! starts. When they are driven from several threads, `SerializedHost` puts
//! the whole contract state (typically the contract together with its asset
//! service) behind one lock so that assumption keeps holding.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use types::numeric::Timestamp;

/// Current wall-clock time in unix seconds.
pub fn wall_clock() -> Timestamp {
    Utc::now().timestamp()
}

/// Runs calls against `S` one at a time.
#[derive(Debug, Default)]
pub struct SerializedHost<S> {
    state: Mutex<S>,
}

impl<S> SerializedHost<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Run `call` under the lock with the current wall-clock time.
    pub fn call<R>(&self, call: impl FnOnce(&mut S, Timestamp) -> R) -> R {
        self.call_at(wall_clock(), call)
    }

    /// Run `call` under the lock with an explicit `now`.
    pub fn call_at<R>(&self, now: Timestamp, call: impl FnOnce(&mut S, Timestamp) -> R) -> R {
        let mut state = self.lock();
        call(&mut *state, now)
    }

    /// Read-only access under the lock.
    pub fn inspect<R>(&self, view: impl FnOnce(&S) -> R) -> R {
        let state = self.lock();
        view(&*state)
    }

    pub fn into_inner(self) -> S {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // Operations commit only after their last fallible step, so state behind
    // a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
