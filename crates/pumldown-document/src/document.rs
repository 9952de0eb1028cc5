//! The document pipeline.
//!
//! A [`Document`] pulls text from its host, and on [`Document::parse`] runs one
//! parse cycle: extract diagram blocks, render the Markdown, render each
//! block and splice it back in. Unchanged text is a no-op.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use pumldown_cache::{Cache, CacheBucket, MemoryCache, NullCacheBucket};
use pumldown_config::{DiagramsConfig, MarkdownConfig};
use pumldown_diagrams::consts::PLACEHOLDER_PREFIX;
use pumldown_diagrams::{DiagramBackend, DiagramRenderer, PlaceholderExtractor, substitute};
use pumldown_markdown::{MarkdownPipeline, MarkdownRender, MarkdownRenderer};

use crate::backend::backend_from_config;
use crate::diagnostics::{DiagnosticsSink, TracingDiagnostics};
use crate::error::PipelineError;
use crate::status::ParseStatus;

/// Result shown for empty or whitespace-only documents.
pub const EMPTY_RESULT: &str = "Empty";

/// Cache bucket holding rendered diagram markup.
const DIAGRAM_BUCKET: &str = "diagrams";

/// Pull accessor returning the host's current document text.
pub type TextSource = Box<dyn Fn() -> String + Send + Sync>;

/// Callback fired after each successful parse.
pub type ParsedCallback = Box<dyn Fn(&Document) + Send + Sync>;

/// Build the Markdown pipeline for `config`.
///
/// Code blocks holding only diagram placeholders are passed through raw so
/// diagrams written inside fences still render.
#[must_use]
pub fn markdown_pipeline(config: MarkdownConfig) -> MarkdownPipeline {
    MarkdownPipeline::new()
        .with_front_matter(config.front_matter)
        .with_line_markers(config.line_markers)
        .with_emoji(config.emoji)
        .with_raw_comment_prefix(PLACEHOLDER_PREFIX)
}

/// Output of the last parse cycle. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Final HTML, `Empty`, or an error fragment.
    pub html: String,
    /// Whether the cycle that produced `html` succeeded.
    pub success: bool,
}

/// What a call to [`Document::parse`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Text matched the last successful parse; nothing was rendered.
    Unchanged,
    /// A new result was rendered and subscribers were notified.
    Rendered,
    /// Rendering failed; the result holds an error fragment.
    Failed,
}

/// A Markdown document with embedded diagrams.
pub struct Document {
    text_source: TextSource,
    markdown: Box<dyn MarkdownRender>,
    diagrams: DiagramsConfig,
    backend: Option<Arc<dyn DiagramBackend>>,
    cache: Arc<dyn Cache>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    last_parsed: Option<String>,
    result: RenderResult,
    status: ParseStatus,
    subscribers: Vec<ParsedCallback>,
}

impl Document {
    /// Create a document reading its text from `text_source`.
    ///
    /// The diagram backend is built from `diagrams` on the first parse that
    /// finds a diagram block.
    pub fn new(
        text_source: impl Fn() -> String + Send + Sync + 'static,
        pipeline: Arc<MarkdownPipeline>,
        diagrams: DiagramsConfig,
    ) -> Self {
        Self {
            text_source: Box::new(text_source),
            markdown: Box::new(MarkdownRenderer::new(pipeline)),
            diagrams,
            backend: None,
            cache: Arc::new(MemoryCache::new()),
            diagnostics: Arc::new(TracingDiagnostics),
            last_parsed: None,
            result: RenderResult::default(),
            status: ParseStatus::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replace the Markdown renderer.
    #[must_use]
    pub fn with_markdown_renderer(mut self, markdown: Box<dyn MarkdownRender>) -> Self {
        self.markdown = markdown;
        self
    }

    /// Use `backend` instead of building one from the diagrams config.
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn DiagramBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Store rendered diagrams in `cache` (in-memory by default).
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = cache;
        self
    }

    /// Report failures to `diagnostics` instead of `tracing`.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Subscribe to successful parses.
    pub fn on_parsed(&mut self, callback: impl Fn(&Document) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Result of the last parse cycle.
    #[must_use]
    pub fn result(&self) -> &RenderResult {
        &self.result
    }

    /// Final HTML of the last parse cycle.
    #[must_use]
    pub fn parsed_result(&self) -> &str {
        &self.result.html
    }

    /// Whether the last parse cycle succeeded.
    #[must_use]
    pub fn success(&self) -> bool {
        self.result.success
    }

    /// Whether a parse cycle is running.
    #[must_use]
    pub fn is_parsing(&self) -> bool {
        self.status.is_parsing()
    }

    /// Handle to the busy flag, observable without borrowing the document.
    #[must_use]
    pub fn status(&self) -> ParseStatus {
        self.status.clone()
    }

    /// Trimmed text of the last successful parse.
    #[must_use]
    pub fn last_parsed(&self) -> Option<&str> {
        self.last_parsed.as_deref()
    }

    /// Backend configuration snapshot.
    #[must_use]
    pub fn diagrams_config(&self) -> &DiagramsConfig {
        &self.diagrams
    }

    /// Replace the backend configuration.
    ///
    /// A changed config drops the current backend so the next parse rebuilds
    /// it, and forgets the last parsed text so the next parse re-renders.
    pub fn set_diagrams_config(&mut self, diagrams: DiagramsConfig) {
        if diagrams == self.diagrams {
            return;
        }
        tracing::debug!(backend = diagrams.backend.as_str(), "Diagram configuration changed");
        self.diagrams = diagrams;
        self.backend = None;
        self.last_parsed = None;
    }

    /// Run one parse cycle.
    ///
    /// Failures never propagate: they are reported to the diagnostics sink
    /// and turned into an HTML error fragment. Subscribers are notified only
    /// after a successful cycle, once the document is back to Idle.
    pub fn parse(&mut self) -> ParseOutcome {
        let busy = self.status.begin();

        let text = (self.text_source)();
        let text = text.trim();
        if self.last_parsed.as_deref() == Some(text) {
            tracing::trace!("Document unchanged, skipping parse");
            return ParseOutcome::Unchanged;
        }

        let rendered = if text.is_empty() {
            Ok(EMPTY_RESULT.to_owned())
        } else {
            catch_unwind(AssertUnwindSafe(|| self.render(text))).unwrap_or_else(|payload| {
                Err(PipelineError::Panicked(panic_message(payload.as_ref())))
            })
        };

        match rendered {
            Ok(html) => {
                self.result = RenderResult {
                    html,
                    success: true,
                };
                self.last_parsed = Some(text.to_owned());
                drop(busy);
                for callback in &self.subscribers {
                    callback(self);
                }
                ParseOutcome::Rendered
            }
            Err(e) => {
                self.diagnostics.report(&e);
                self.result = RenderResult {
                    html: e.to_html(),
                    success: false,
                };
                ParseOutcome::Failed
            }
        }
    }

    fn render(&mut self, text: &str) -> Result<String, PipelineError> {
        let extraction = PlaceholderExtractor::plantuml().extract(text);
        let html = self.markdown.render(&extraction.text)?;

        if extraction.blocks.is_empty() {
            return Ok(html);
        }

        let renderer = DiagramRenderer::new(self.backend()?).with_cache(self.diagram_bucket());
        let rendered = renderer.render_all(&extraction.blocks)?;
        Ok(substitute(&html, &rendered)?)
    }

    fn backend(&mut self) -> Result<Arc<dyn DiagramBackend>, PipelineError> {
        if let Some(backend) = &self.backend {
            return Ok(Arc::clone(backend));
        }
        let backend = backend_from_config(&self.diagrams)?;
        tracing::debug!(backend = backend.name(), "Created diagram backend");
        self.backend = Some(Arc::clone(&backend));
        Ok(backend)
    }

    fn diagram_bucket(&self) -> Box<dyn CacheBucket> {
        if self.diagrams.cache_enabled {
            self.cache.bucket(DIAGRAM_BUCKET)
        } else {
            Box::new(NullCacheBucket)
        }
    }
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
