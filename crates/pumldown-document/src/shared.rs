//! Documents shared between a host and background parse tasks.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::document::Document;

/// A document shared across threads.
///
/// The mutex serializes overlapping parse requests for one document; other
/// documents are unaffected.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Wrap `document` for sharing.
#[must_use]
pub fn share(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}

/// Start a parse on a dedicated thread without waiting for it.
///
/// The document lock is held for the whole parse, so the task must not run
/// on the rayon pool that renders its diagrams. Overlapping requests queue
/// on the lock and each parses the text current when it gets its turn.
///
/// The outcome is only observable through the document's result, its
/// `parsed` subscribers, and the diagnostics sink.
pub fn spawn_parse(document: &SharedDocument) {
    let document = Arc::clone(document);
    let spawned = thread::Builder::new()
        .name("pumldown-parse".to_owned())
        .spawn(move || {
            let mut document = document.lock().unwrap_or_else(PoisonError::into_inner);
            let outcome = document.parse();
            tracing::debug!(?outcome, "Background parse finished");
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "Failed to start background parse");
    }
}
