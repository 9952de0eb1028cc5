//! Pipeline errors and their HTML rendering.

use std::error::Error;
use std::fmt::Write;

use pumldown_diagrams::DiagramError;
use pumldown_markdown::{MarkdownError, error_fragment};

/// Error that fails a whole parse cycle.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Markdown compilation failed.
    #[error("markdown rendering failed")]
    Markdown(#[from] MarkdownError),
    /// A diagram block could not be rendered.
    #[error("diagram rendering failed")]
    Diagram(#[from] DiagramError),
    /// The remote backend is selected but has no base URL.
    #[error("remote diagram backend selected but no remote URL is configured")]
    MissingRemoteUrl,
    /// A pipeline stage panicked.
    #[error("document pipeline panicked: {0}")]
    Panicked(String),
}

impl PipelineError {
    /// Display string followed by one `caused by:` line per source.
    #[must_use]
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let _ = write!(message, "\ncaused by: {cause}");
            source = cause.source();
        }
        message
    }

    /// HTML fragment shown in place of the document.
    #[must_use]
    pub fn to_html(&self) -> String {
        error_fragment(&self.report())
    }
}
