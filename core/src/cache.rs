//! Bounded LRU cache for filter results
//!
//! Keyed by [`PlanFingerprint`], which embeds the registry version, so a
//! registry swap opens a fresh key space and stale entries simply age out.
//! Internally synchronized; the lock is held only across a single map
//! operation.

use crate::plan::PlanFingerprint;
use lru::LruCache;
use roaring::RoaringBitmap;
use std::num::NonZeroUsize;
use std::sync::Mutex;

#[derive(Debug)]
pub struct FilterCache {
    entries: Mutex<LruCache<PlanFingerprint, RoaringBitmap>>,
}

impl FilterCache {
    /// A cache holding at most `capacity` results. A zero capacity is
    /// clamped to one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("clamped to at least 1");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch a cached result, marking the entry most-recently used.
    pub fn get(&self, key: &PlanFingerprint) -> Option<RoaringBitmap> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Store a result, evicting the least-recently-used entry when full.
    pub fn insert(&self, key: PlanFingerprint, result: RoaringBitmap) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.put(key, result);
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }
}
