//! Diagram cache key computation.
//!
//! Provides [`DiagramKey`] for computing content-based hashes used as cache keys.

use sha2::{Digest, Sha256};

/// Diagram parameters for cache key computation.
///
/// Contains all parameters that affect the rendered diagram output.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram block source, tags included.
    pub source: &'a str,
    /// Backend that renders it (e.g., "local", "remote").
    pub backend: &'a str,
    /// Output format ("svg").
    pub format: &'a str,
}

impl DiagramKey<'_> {
    /// Compute a content hash for this diagram key.
    ///
    /// SHA-256 of `"{backend}:{format}:{source}"`, hex encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!("{}:{}:{}", self.backend, self.format, self.source);
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}
