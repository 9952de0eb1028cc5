//! Cache abstraction for pumldown.
//!
//! Rendered diagram markup is memoized by content hash so that editing the
//! prose around a diagram does not re-run the diagram engine. Two traits form
//! the API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store of raw bytes
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: Process-local map, shared between buckets of the same name
//! - [`FileCache`]: File-based implementation with version validation
//!
//! Keys are content-addressed by the caller, so buckets never validate
//! freshness: a key either maps to the right bytes or is absent.
//!
//! # Example
//!
//! ```
//! use pumldown_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("diagrams");
//! bucket.set_string("3f2a", "<svg/>");
//! assert_eq!(bucket.get_string("3f2a").as_deref(), Some("<svg/>"));
//! ```

mod file;
mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` on miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any existing entry for the same key.
    ///
    /// Failures are swallowed: a cache that cannot store is a cache that misses.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets with different names are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// # Arguments
    ///
    /// * `name` - Bucket name (e.g., "diagrams")
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// Typed convenience methods for [`CacheBucket`].
///
/// Kept on an extension trait so [`CacheBucket`] stays object-safe and
/// implementors only deal in bytes.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
