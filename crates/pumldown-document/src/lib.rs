//! Markdown documents with embedded PlantUML diagrams.
//!
//! [`Document`] owns one parse pipeline: pull the host text, skip if it is
//! unchanged, replace diagram blocks with placeholders, render the Markdown,
//! render each diagram through the configured backend and substitute the
//! results.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pumldown_config::{DiagramsConfig, MarkdownConfig};
//! use pumldown_document::{Document, ParseOutcome, markdown_pipeline};
//!
//! let pipeline = Arc::new(markdown_pipeline(MarkdownConfig {
//!     line_markers: false,
//!     emoji: true,
//!     front_matter: true,
//! }));
//! let mut doc = Document::new(
//!     || "Ship it :rocket:".to_owned(),
//!     pipeline,
//!     DiagramsConfig::default(),
//! );
//!
//! assert_eq!(doc.parse(), ParseOutcome::Rendered);
//! assert_eq!(doc.parsed_result(), "<p>Ship it 🚀</p>\n");
//! assert_eq!(doc.parse(), ParseOutcome::Unchanged);
//! ```

mod backend;
mod diagnostics;
mod document;
mod error;
mod shared;
mod status;

pub use backend::backend_from_config;
pub use diagnostics::{DiagnosticsSink, TracingDiagnostics};
pub use document::{
    Document, EMPTY_RESULT, ParseOutcome, ParsedCallback, RenderResult, TextSource,
    markdown_pipeline,
};
pub use error::PipelineError;
pub use shared::{SharedDocument, share, spawn_parse};
pub use status::ParseStatus;
