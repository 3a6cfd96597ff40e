//! Memoised deferred values.
//!
//! Field lists are declared as closures that run only when the compiler
//! first needs them. [`Deferred`] runs such a closure at most once and shares
//! the result with every later caller, across threads and across compiles.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

type Thunk<T> = Box<dyn FnOnce() -> T + Send>;

enum State<T> {
    Pending(Thunk<T>),
    Resolving(ThreadId),
    Ready(Arc<T>),
    Poisoned,
}

/// Why a deferred value could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceError {
    /// The thunk asked for its own value.
    Reentrant,
    /// The thunk panicked on an earlier attempt.
    Poisoned,
}

/// A value computed on first use by a thunk that runs at most once.
pub struct Deferred<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
}

impl<T> Deferred<T> {
    pub fn new(thunk: impl FnOnce() -> T + Send + 'static) -> Self {
        Self {
            state: Mutex::new(State::Pending(Box::new(thunk))),
            ready: Condvar::new(),
        }
    }

    /// Returns true once the value has been computed.
    pub fn is_ready(&self) -> bool {
        matches!(*self.lock(), State::Ready(_))
    }

    /// Returns the value, running the thunk if nobody has yet.
    ///
    /// Other threads block until the running thunk finishes. The thread
    /// running the thunk gets [`ForceError::Reentrant`] instead of deadlocking.
    pub fn force(&self) -> Result<Arc<T>, ForceError> {
        let me = thread::current().id();
        let mut state = self.lock();
        loop {
            let wait = match &*state {
                State::Ready(value) => return Ok(Arc::clone(value)),
                State::Poisoned => return Err(ForceError::Poisoned),
                State::Resolving(owner) if *owner == me => return Err(ForceError::Reentrant),
                State::Resolving(_) => true,
                State::Pending(_) => false,
            };
            if !wait {
                break;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let thunk = match std::mem::replace(&mut *state, State::Resolving(me)) {
            State::Pending(thunk) => thunk,
            _ => unreachable!("only pending cells reach this point"),
        };
        drop(state);

        let outcome = panic::catch_unwind(AssertUnwindSafe(thunk));

        let mut state = self.lock();
        let result = match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                *state = State::Ready(Arc::clone(&value));
                Ok(value)
            }
            Err(_) => {
                *state = State::Poisoned;
                Err(ForceError::Poisoned)
            }
        };
        self.ready.notify_all();
        result
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.lock() {
            State::Pending(_) => "pending",
            State::Resolving(_) => "resolving",
            State::Ready(_) => "ready",
            State::Poisoned => "poisoned",
        };
        f.debug_struct("Deferred").field("state", &state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cell = Deferred::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            vec!["id", "name"]
        });

        assert!(!cell.is_ready());
        let first = cell.force().unwrap();
        let second = cell.force().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cell.is_ready());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_force_is_reported() {
        static CELL: OnceLock<Deferred<Result<u32, ForceError>>> = OnceLock::new();
        let cell = CELL.get_or_init(|| {
            Deferred::new(|| match CELL.get() {
                Some(cell) => cell.force().map(|_| 1),
                None => Ok(0),
            })
        });

        let value = cell.force().unwrap();
        assert_eq!(*value, Err(ForceError::Reentrant));
    }

    #[test]
    fn test_panicking_thunk_poisons() {
        let cell: Deferred<u32> = Deferred::new(|| panic!("boom"));
        assert_eq!(cell.force().unwrap_err(), ForceError::Poisoned);
        assert_eq!(cell.force().unwrap_err(), ForceError::Poisoned);
    }

    #[test]
    fn test_concurrent_force_waits_for_owner() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cell = Arc::new(Deferred::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            42
        }));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || *cell.force().unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
