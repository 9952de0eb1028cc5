//! Markdown renderer with a reusable output buffer.

use std::any::Any;
use std::borrow::Cow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, LazyLock};

use pulldown_cmark::Parser;
use regex::Regex;

use crate::MarkdownPipeline;
use crate::events::EventRewriter;
use crate::html::error_fragment;

/// Matches the C# fence label in a generated `class` attribute.
static CSHARP_LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""language-(?i:c)#""#).unwrap());

/// Error returned when Markdown rendering fails.
#[derive(Debug, thiserror::Error)]
pub enum MarkdownError {
    /// The underlying Markdown compiler panicked.
    #[error("markdown renderer panicked: {0}")]
    Panicked(String),
}

/// Converts Markdown text to HTML.
///
/// Implementations may keep scratch state between calls, hence `&mut self`.
pub trait MarkdownRender: Send {
    /// Render `markdown` to an HTML string.
    fn render(&mut self, markdown: &str) -> Result<String, MarkdownError>;
}

/// `pulldown-cmark` based [`MarkdownRender`] implementation.
///
/// Owns one output buffer that is cleared before and after every call, so
/// repeated renders on the same instance reuse its allocation without
/// leaking content between documents.
pub struct MarkdownRenderer {
    pipeline: Arc<MarkdownPipeline>,
    scratch: String,
}

impl MarkdownRenderer {
    /// Create a renderer sharing the given pipeline configuration.
    #[must_use]
    pub fn new(pipeline: Arc<MarkdownPipeline>) -> Self {
        Self {
            pipeline,
            scratch: String::with_capacity(4096),
        }
    }

    /// Pipeline configuration this renderer uses.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<MarkdownPipeline> {
        &self.pipeline
    }

    /// Render `markdown`, turning any failure into an HTML error fragment.
    ///
    /// Never propagates an error to the caller.
    pub fn render_or_error_fragment(&mut self, markdown: &str) -> String {
        self.render(markdown).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Markdown rendering failed");
            error_fragment(&e.to_string())
        })
    }
}

impl MarkdownRender for MarkdownRenderer {
    fn render(&mut self, markdown: &str) -> Result<String, MarkdownError> {
        self.scratch.clear();

        let pipeline = &self.pipeline;
        let scratch = &mut self.scratch;
        let written = catch_unwind(AssertUnwindSafe(|| {
            let parser = Parser::new_ext(markdown, pipeline.parser_options());
            let events = EventRewriter::new(pipeline, markdown).rewrite(parser.into_offset_iter());
            pulldown_cmark::html::push_html(scratch, events.into_iter());
        }));

        let result = match written {
            Ok(()) => Ok(normalize_code_languages(&self.scratch).into_owned()),
            Err(payload) => Err(MarkdownError::Panicked(panic_message(payload.as_ref()))),
        };

        self.scratch.clear();
        result
    }
}

/// Rewrite `language-c#` fence classes (any case) to `language-csharp`.
fn normalize_code_languages(html: &str) -> Cow<'_, str> {
    CSHARP_LANGUAGE_RE.replace_all(html, "\"language-csharp\"")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
