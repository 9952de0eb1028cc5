//! Shared rendering configuration.

use pulldown_cmark::Options;

/// Immutable Markdown rendering configuration.
///
/// Built once at startup and handed to every [`MarkdownRenderer`] through an
/// `Arc`, so all documents render with identical settings.
///
/// [`MarkdownRenderer`]: crate::MarkdownRenderer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkdownPipeline {
    front_matter: bool,
    line_markers: bool,
    emoji: bool,
    raw_comment_prefix: Option<String>,
}

impl Default for MarkdownPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownPipeline {
    /// Create the default pipeline: advanced extensions, front matter, line
    /// markers and emoji all enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            front_matter: true,
            line_markers: true,
            emoji: true,
            raw_comment_prefix: None,
        }
    }

    /// Swallow a leading `---` YAML front matter block.
    #[must_use]
    pub fn with_front_matter(mut self, enabled: bool) -> Self {
        self.front_matter = enabled;
        self
    }

    /// Emit `<span id="pragma-line-N"></span>` before every top-level block,
    /// N being the block's 0-based source line.
    #[must_use]
    pub fn with_line_markers(mut self, enabled: bool) -> Self {
        self.line_markers = enabled;
        self
    }

    /// Replace `:shortcode:` emoji outside code.
    #[must_use]
    pub fn with_emoji(mut self, enabled: bool) -> Self {
        self.emoji = enabled;
        self
    }

    /// Emit code blocks as raw HTML when their whole content is HTML comments
    /// starting with `prefix`.
    ///
    /// Placeholders written inside a fenced block would otherwise come out
    /// escaped and could not be found again in the output.
    #[must_use]
    pub fn with_raw_comment_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.raw_comment_prefix = Some(prefix.into());
        self
    }

    /// Parser options for this pipeline.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_GFM;
        if self.front_matter {
            options |= Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        }
        options
    }

    pub(crate) fn line_markers(&self) -> bool {
        self.line_markers
    }

    pub(crate) fn emoji(&self) -> bool {
        self.emoji
    }

    pub(crate) fn raw_comment_prefix(&self) -> Option<&str> {
        self.raw_comment_prefix.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_include_advanced_extensions() {
        let options = MarkdownPipeline::new().parser_options();

        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(options.contains(Options::ENABLE_FOOTNOTES));
        assert!(options.contains(Options::ENABLE_TASKLISTS));
        assert!(options.contains(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS));
    }

    #[test]
    fn test_front_matter_can_be_disabled() {
        let options = MarkdownPipeline::new()
            .with_front_matter(false)
            .parser_options();

        assert!(!options.contains(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS));
    }
}
