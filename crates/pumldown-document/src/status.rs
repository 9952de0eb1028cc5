//! Busy tracking for parse cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared Idle/Parsing flag of a document.
///
/// Clones observe the same flag, so a host can poll it while the document
/// itself is locked by a running parse.
#[derive(Debug, Clone, Default)]
pub struct ParseStatus {
    busy: Arc<AtomicBool>,
}

impl ParseStatus {
    /// Whether a parse cycle is in progress.
    #[must_use]
    pub fn is_parsing(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Enter the Parsing state until the returned guard is dropped.
    pub(crate) fn begin(&self) -> BusyGuard {
        self.busy.store(true, Ordering::Release);
        BusyGuard {
            busy: Arc::clone(&self.busy),
        }
    }
}

/// Returns the document to Idle on drop, including on unwind.
pub(crate) struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
