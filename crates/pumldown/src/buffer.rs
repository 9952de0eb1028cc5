//! Host-side text buffer the document pulls from.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Current text of the file being previewed.
///
/// The CLI refreshes it from disk; the document reads it through its text
/// source on every parse.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextBuffer {
    text: Arc<Mutex<String>>,
}

impl TextBuffer {
    /// Replace the buffer with the contents of `path`.
    ///
    /// On error the previous text is kept.
    pub(crate) fn load(&self, path: &Path) -> std::io::Result<()> {
        let text = fs::read_to_string(path)?;
        *self.text.lock().unwrap_or_else(PoisonError::into_inner) = text;
        Ok(())
    }

    /// Snapshot of the current text.
    pub(crate) fn text(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
