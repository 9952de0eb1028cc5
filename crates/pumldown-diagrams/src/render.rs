//! Parallel rendering of extracted blocks and marker substitution.

use std::sync::Arc;

use pumldown_cache::{CacheBucket, CacheBucketExt, NullCacheBucket};
use rayon::prelude::*;

use crate::backend::DiagramBackend;
use crate::cache::DiagramKey;
use crate::error::{DiagramError, DiagramErrorKind};
use crate::extract::{PlaceholderMap, placeholder_marker};

/// Output format recorded in cache keys.
const OUTPUT_FORMAT: &str = "svg";

/// Rendered markup for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDiagram {
    /// Key of the block this markup replaces.
    pub key: String,
    /// Markup returned by the backend.
    pub markup: String,
}

/// Renders diagram blocks through a backend, memoizing results in a cache bucket.
pub struct DiagramRenderer {
    backend: Arc<dyn DiagramBackend>,
    cache: Box<dyn CacheBucket>,
}

impl DiagramRenderer {
    /// Create a renderer without caching.
    #[must_use]
    pub fn new(backend: Arc<dyn DiagramBackend>) -> Self {
        Self {
            backend,
            cache: Box::new(NullCacheBucket),
        }
    }

    /// Memoize rendered markup in `cache`.
    ///
    /// Entries are keyed by backend, format, and block source. Fallback
    /// output is never stored.
    #[must_use]
    pub fn with_cache(mut self, cache: Box<dyn CacheBucket>) -> Self {
        self.cache = cache;
        self
    }

    /// Backend in use.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn DiagramBackend> {
        &self.backend
    }

    /// Render one block source, consulting the cache first.
    pub fn render_one(&self, source: &str) -> Result<String, DiagramErrorKind> {
        let hash = DiagramKey {
            source,
            backend: self.backend.name(),
            format: OUTPUT_FORMAT,
        }
        .compute_hash();

        if let Some(markup) = self.cache.get_string(&hash) {
            tracing::trace!(hash = %hash, "Diagram cache hit");
            return Ok(markup);
        }

        let output = self.backend.render(source)?;
        if output.is_cacheable() {
            self.cache.set_string(&hash, output.markup());
        }
        Ok(output.into_markup())
    }

    /// Render every block in parallel on the rayon pool.
    ///
    /// Fails with the first error encountered; no partial output is returned.
    pub fn render_all(
        &self,
        blocks: &PlaceholderMap,
    ) -> Result<Vec<RenderedDiagram>, DiagramError> {
        if blocks.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            count = blocks.len(),
            backend = self.backend.name(),
            "Rendering diagrams"
        );

        blocks
            .as_map()
            .par_iter()
            .map(|(key, source)| {
                self.render_one(source)
                    .map(|markup| RenderedDiagram {
                        key: key.clone(),
                        markup,
                    })
                    .map_err(|kind| DiagramError {
                        key: key.clone(),
                        kind,
                    })
            })
            .collect()
    }
}

/// Replace each block's marker in `html` with its rendered markup.
///
/// Uses exact string matching per key. Markers whose key has no rendered
/// entry are left in place.
///
/// # Errors
///
/// Returns [`DiagramErrorKind::MarkerMissing`] for the first rendered block
/// whose marker does not appear in `html`.
pub fn substitute(html: &str, rendered: &[RenderedDiagram]) -> Result<String, DiagramError> {
    let mut result = html.to_owned();
    for diagram in rendered {
        let marker = placeholder_marker(&diagram.key);
        if !result.contains(&marker) {
            tracing::warn!(key = %diagram.key, "Placeholder marker not found in HTML");
            return Err(DiagramError {
                key: diagram.key.clone(),
                kind: DiagramErrorKind::MarkerMissing,
            });
        }
        result = result.replace(&marker, &diagram.markup);
    }
    Ok(result)
}
