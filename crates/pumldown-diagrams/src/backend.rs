//! Diagram rendering backends.

use crate::error::DiagramErrorKind;

/// Markup produced by a backend for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutput {
    /// The diagram rendered; safe to memoize by source.
    Rendered(String),
    /// Placeholder markup shown in place of a diagram the backend could not
    /// render. Never memoized, so the next parse retries the block.
    Fallback(String),
}

impl DiagramOutput {
    /// Markup to embed in the HTML.
    #[must_use]
    pub fn markup(&self) -> &str {
        match self {
            Self::Rendered(markup) | Self::Fallback(markup) => markup,
        }
    }

    /// Consume the output, returning its markup.
    #[must_use]
    pub fn into_markup(self) -> String {
        match self {
            Self::Rendered(markup) | Self::Fallback(markup) => markup,
        }
    }

    /// Whether the output may be stored in a diagram cache.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }
}

/// Turns one diagram block source into SVG markup.
///
/// Implementations are shared across rendering threads.
pub trait DiagramBackend: Send + Sync {
    /// Short backend identifier, used in cache keys and logs.
    fn name(&self) -> &'static str;

    /// Render `source` (tags included) to markup for embedding in HTML.
    fn render(&self, source: &str) -> Result<DiagramOutput, DiagramErrorKind>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rendered_output_is_cacheable() {
        assert!(DiagramOutput::Rendered("<svg/>".to_owned()).is_cacheable());
        assert!(!DiagramOutput::Fallback("<svg/>".to_owned()).is_cacheable());
    }

    #[test]
    fn test_markup_ignores_variant() {
        assert_eq!(DiagramOutput::Fallback("Error".to_owned()).markup(), "Error");
        assert_eq!(
            DiagramOutput::Rendered("<svg/>".to_owned()).into_markup(),
            "<svg/>"
        );
    }
}
