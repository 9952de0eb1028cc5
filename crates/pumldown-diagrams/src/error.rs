//! Diagram rendering errors.

use std::time::Duration;

/// Error rendering a single diagram block.
#[derive(Debug, thiserror::Error)]
#[error("diagram {key}: {kind}")]
pub struct DiagramError {
    /// Key of the block that failed.
    pub key: String,
    /// What went wrong.
    pub kind: DiagramErrorKind,
}

/// Failure reported by a [`DiagramBackend`](crate::DiagramBackend).
#[derive(Debug, thiserror::Error)]
pub enum DiagramErrorKind {
    /// The diagram engine process could not be started.
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },
    /// Reading from or writing to the engine failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// The engine exited unsuccessfully.
    #[error("diagram engine exited with {status}: {stderr}")]
    EngineFailed { status: String, stderr: String },
    /// The engine did not finish within the configured timeout.
    #[error("diagram engine timed out after {0:?}")]
    Timeout(Duration),
    /// The engine produced output that is not valid UTF-8.
    #[error("diagram output is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    /// The remote renderer could not be reached.
    #[error("HTTP error: {0}")]
    Http(String),
    /// The block's placeholder did not survive Markdown rendering.
    #[error("placeholder marker missing from rendered HTML")]
    MarkerMissing,
}
