//! Bounded LRU cache for raster blocks.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Fixed-capacity cache mapping flat block indexes to owned pixel buffers.
///
/// Recency is updated on [`get_mut`](BlockCache::get_mut) and on insertion;
/// [`contains`](BlockCache::contains) is a pure lookup. When an insertion
/// overflows the capacity, the least-recently-used entry is removed and
/// handed back to the caller by move. The cache never writes anything itself:
/// deciding whether an evicted buffer must reach disk is the caller's job.
pub struct BlockCache {
    inner: LruCache<usize, Vec<f64>>,
}

impl BlockCache {
    /// Create a cache holding at most `capacity` blocks.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            inner: LruCache::new(cap),
        }
    }

    /// Whether `block_index` is resident. Does not touch recency.
    pub fn contains(&self, block_index: usize) -> bool {
        self.inner.contains(&block_index)
    }

    /// Mutable access to a resident buffer; the block becomes most recent.
    pub fn get_mut(&mut self, block_index: usize) -> Option<&mut Vec<f64>> {
        self.inner.get_mut(&block_index)
    }

    /// Insert a buffer for a block that is not currently resident.
    ///
    /// Returns the evicted `(block_index, buffer)` pair when the cache was at
    /// capacity, `None` otherwise. The inserted block becomes most recent.
    pub fn put(&mut self, block_index: usize, buffer: Vec<f64>) -> Option<(usize, Vec<f64>)> {
        debug_assert!(!self.contains(block_index), "block {block_index} already resident");
        self.inner.push(block_index, buffer)
    }

    /// Remove and return the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(usize, Vec<f64>)> {
        self.inner.pop_lru()
    }

    /// Number of resident blocks.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over resident `(block_index, buffer)` pairs, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Vec<f64>)> {
        self.inner.iter().map(|(k, v)| (*k, v))
    }
}
