//! Event rewriting between the parser and the HTML writer.
//!
//! Applies the pipeline's extensions on the `pulldown-cmark` event stream:
//! front matter removal, line-position markers, emoji, and raw passthrough of
//! code blocks that only hold placeholder comments.

use std::ops::Range;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::MarkdownPipeline;
use crate::emoji::replace_shortcodes;

/// A code block held back until its end tag decides how it is emitted.
struct PendingCodeBlock<'a> {
    events: Vec<Event<'a>>,
    text: String,
}

/// Rewrites parser events according to a [`MarkdownPipeline`].
pub(crate) struct EventRewriter<'p, 'a> {
    pipeline: &'p MarkdownPipeline,
    line_starts: Vec<usize>,
    output: Vec<Event<'a>>,
    depth: usize,
    in_metadata: bool,
    code: Option<PendingCodeBlock<'a>>,
}

impl<'p, 'a> EventRewriter<'p, 'a> {
    pub(crate) fn new(pipeline: &'p MarkdownPipeline, source: &str) -> Self {
        let line_starts = if pipeline.line_markers() {
            std::iter::once(0)
                .chain(source.match_indices('\n').map(|(i, _)| i + 1))
                .collect()
        } else {
            Vec::new()
        };

        Self {
            pipeline,
            line_starts,
            output: Vec::new(),
            depth: 0,
            in_metadata: false,
            code: None,
        }
    }

    /// Consume parser events (with source offsets) and return the rewritten stream.
    pub(crate) fn rewrite(
        mut self,
        events: impl Iterator<Item = (Event<'a>, Range<usize>)>,
    ) -> Vec<Event<'a>> {
        for (event, range) in events {
            self.push(event, &range);
        }
        self.output
    }

    fn push(&mut self, event: Event<'a>, range: &Range<usize>) {
        match event {
            Event::Start(Tag::MetadataBlock(_)) => self.in_metadata = true,
            Event::End(TagEnd::MetadataBlock(_)) => self.in_metadata = false,
            _ if self.in_metadata => {}
            Event::Start(tag @ Tag::CodeBlock(_)) => {
                self.mark_line(range.start);
                self.depth += 1;
                self.code = Some(PendingCodeBlock {
                    events: vec![Event::Start(tag)],
                    text: String::new(),
                });
            }
            Event::End(TagEnd::CodeBlock) => {
                self.depth -= 1;
                self.finish_code_block();
            }
            Event::Text(text) if self.code.is_some() => {
                if let Some(code) = self.code.as_mut() {
                    code.text.push_str(&text);
                    code.events.push(Event::Text(text));
                }
            }
            Event::Start(tag) => {
                self.mark_line(range.start);
                self.depth += 1;
                self.output.push(Event::Start(tag));
            }
            Event::End(tag) => {
                self.depth = self.depth.saturating_sub(1);
                self.output.push(Event::End(tag));
            }
            Event::Text(text) if self.pipeline.emoji() => {
                let replaced = match replace_shortcodes(&text) {
                    std::borrow::Cow::Borrowed(_) => None,
                    std::borrow::Cow::Owned(owned) => Some(owned),
                };
                let text = replaced.map_or(text, CowStr::from);
                self.output.push(Event::Text(text));
            }
            other => self.output.push(other),
        }
    }

    /// Emit a line-position anchor if a top-level block starts at `offset`.
    fn mark_line(&mut self, offset: usize) {
        if self.depth != 0 || !self.pipeline.line_markers() {
            return;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        self.output.push(Event::Html(CowStr::from(format!(
            "<span id=\"pragma-line-{line}\"></span>"
        ))));
    }

    fn finish_code_block(&mut self) {
        let Some(mut code) = self.code.take() else {
            return;
        };

        if let Some(prefix) = self.pipeline.raw_comment_prefix()
            && only_comments_with_prefix(&code.text, prefix)
        {
            tracing::trace!("Emitting placeholder-only code block as raw HTML");
            let mut raw = code.text;
            if !raw.ends_with('\n') {
                raw.push('\n');
            }
            self.output.push(Event::Html(CowStr::from(raw)));
            return;
        }

        code.events.push(Event::End(TagEnd::CodeBlock));
        self.output.append(&mut code.events);
    }
}

/// Whether `text` is nothing but whitespace-separated `<!...-->` comments
/// beginning with `prefix`.
fn only_comments_with_prefix(text: &str, prefix: &str) -> bool {
    let mut rest = text.trim_start();
    if rest.is_empty() {
        return false;
    }
    while !rest.is_empty() {
        let Some(after_prefix) = rest.strip_prefix(prefix) else {
            return false;
        };
        let Some(end) = after_prefix.find("-->") else {
            return false;
        };
        rest = after_prefix[end + 3..].trim_start();
    }
    true
}
