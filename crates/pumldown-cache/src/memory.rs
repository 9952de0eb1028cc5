//! In-process cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::{Cache, CacheBucket};

type Entries = HashMap<String, Vec<u8>>;

/// Process-local [`Cache`] backed by hash maps.
///
/// Clones share storage, and every call to [`bucket`](Cache::bucket) with the
/// same name returns a handle onto the same map. Entries live until the last
/// handle is dropped.
#[derive(Clone, Default)]
pub struct MemoryCache {
    buckets: Arc<Mutex<HashMap<String, Arc<Mutex<Entries>>>>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let entries = buckets.entry(name.to_owned()).or_default();
        Box::new(MemoryCacheBucket {
            entries: Arc::clone(entries),
        })
    }
}

struct MemoryCacheBucket {
    entries: Arc<Mutex<Entries>>,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_vec());
    }
}
