//! Change debouncing for the watched file.
//!
//! Editors often emit several events per save (truncate, write, rename). The
//! debouncer collapses a burst into one re-parse once the file has been quiet
//! for the debounce window.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Thread-safe single-file change debouncer.
pub(crate) struct ChangeDebouncer {
    deadline: Mutex<Option<Instant>>,
    debounce_duration: Duration,
}

impl ChangeDebouncer {
    /// Create a new debouncer with the specified debounce duration.
    pub(crate) fn new(debounce_duration: Duration) -> Self {
        Self {
            deadline: Mutex::new(None),
            debounce_duration,
        }
    }

    /// Record a change, pushing the deadline back.
    ///
    /// Called from file system watcher callbacks.
    pub(crate) fn record(&self) {
        *self.lock() = Some(Instant::now() + self.debounce_duration);
    }

    /// Whether a recorded change has settled. Resets the debouncer when it has.
    pub(crate) fn take_ready(&self) -> bool {
        let mut deadline = self.lock();
        match *deadline {
            Some(at) if at <= Instant::now() => {
                *deadline = None;
                true
            }
            _ => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.deadline.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
