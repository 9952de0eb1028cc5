//! Markdown to HTML rendering for pumldown.
//!
//! The crate wraps `pulldown-cmark` behind two pieces:
//! - [`MarkdownPipeline`]: immutable rendering configuration (extensions,
//!   line markers, emoji, raw comment passthrough), built once and shared
//!   through an `Arc` by every renderer
//! - [`MarkdownRenderer`]: owns a reusable output buffer and turns text into
//!   HTML, then normalizes code fence language classes
//!
//! The [`MarkdownRender`] trait is the seam the document pipeline depends on,
//! so hosts and tests can substitute their own renderer.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pumldown_markdown::{MarkdownPipeline, MarkdownRender, MarkdownRenderer};
//!
//! let pipeline = Arc::new(MarkdownPipeline::new().with_line_markers(false));
//! let mut renderer = MarkdownRenderer::new(pipeline);
//! let html = renderer.render("# Hello :wave:").unwrap();
//! assert_eq!(html, "<h1>Hello 👋</h1>\n");
//! ```

mod emoji;
mod events;
mod html;
mod pipeline;
mod renderer;

pub use html::{error_fragment, escape_html};
pub use pipeline::MarkdownPipeline;
pub use renderer::{MarkdownError, MarkdownRender, MarkdownRenderer};
