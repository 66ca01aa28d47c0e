//! Cached pixel-level access over a tiled raster band.

use std::collections::HashSet;

use crate::cache::BlockCache;
use crate::error::{Error, Result};
use crate::io::TiledBand;
use crate::raster::blocks::BlockGrid;
use crate::raster::GeoTransform;

/// Default number of blocks held resident per managed raster.
pub const DEFAULT_BLOCK_CAPACITY: usize = 64;

/// Which half of a block transfer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    Read,
    Write,
}

/// Record of a non-fatal block transfer failure.
///
/// Block I/O errors do not abort processing: the operation is logged,
/// recorded here, and control returns to the caller with the cache state
/// as-is. Callers that need durability inspect this log after
/// [`close`](ManagedRaster::close).
#[derive(Debug)]
pub struct IoFailure {
    pub block_index: usize,
    pub direction: IoDirection,
    pub error: Error,
}

/// Tolerance comparison used for nodata matching.
///
/// NaN compares equal to NaN; otherwise `|a - b| <= 1e-8 + 1e-5 * |b|`.
pub fn is_close(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// Pixel-level reads and writes over a tiled band, amortized into whole-block
/// I/O through a bounded LRU cache.
///
/// Blocks are loaded on first touch and held resident until evicted. In write
/// mode, blocks that received a [`set`](ManagedRaster::set) are tracked as
/// dirty and written back when evicted and at [`close`](ManagedRaster::close);
/// a dropped raster closes itself.
///
/// A managed raster is single-threaded and must not be shared; callers
/// parallelize by opening separate instances over disjoint regions.
pub struct ManagedRaster<B: TiledBand> {
    band: Option<B>,
    grid: BlockGrid,
    cache: BlockCache,
    dirty: HashSet<usize>,
    geotransform: GeoTransform,
    nodata: Option<f64>,
    write_mode: bool,
    closed: bool,
    failures: Vec<IoFailure>,
}

impl<B: TiledBand> ManagedRaster<B> {
    /// Wrap an opened band behind a cache of
    /// [`DEFAULT_BLOCK_CAPACITY`] blocks.
    ///
    /// Fails if the band's block dimensions are not powers of two.
    pub fn new(band: B, write_mode: bool) -> Result<Self> {
        Self::with_cache_capacity(band, write_mode, DEFAULT_BLOCK_CAPACITY)
    }

    /// Like [`new`](ManagedRaster::new) with an explicit cache capacity in
    /// blocks.
    pub fn with_cache_capacity(band: B, write_mode: bool, capacity: usize) -> Result<Self> {
        let (width, height) = band.raster_size();
        let (block_xsize, block_ysize) = band.block_size();
        let grid = BlockGrid::new(width, height, block_xsize, block_ysize)?;
        let geotransform = band.geo_transform();
        let nodata = band.nodata();

        Ok(Self {
            band: Some(band),
            grid,
            cache: BlockCache::new(capacity),
            dirty: HashSet::new(),
            geotransform,
            nodata,
            write_mode,
            closed: false,
            failures: Vec::new(),
        })
    }

    /// Value of the pixel at `(x, y)`, loading its block on a cache miss.
    pub fn get(&mut self, x: usize, y: usize) -> f64 {
        debug_assert!(!self.closed, "operation on closed raster");
        debug_assert!(
            self.grid.contains(x, y),
            "pixel ({x}, {y}) outside {}x{} raster",
            self.grid.width(),
            self.grid.height()
        );

        let block_index = self.grid.block_index(x, y);
        if !self.cache.contains(block_index) {
            self.load_block(block_index);
        }
        let idx = self.grid.cell_index(block_index, x, y);
        self.cache.get_mut(block_index).expect("block resident after load")[idx]
    }

    /// Set the pixel at `(x, y)` to `value` and mark its block dirty.
    ///
    /// Requires write mode; calling this on a read-only raster is a
    /// programming error (checked in debug builds).
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        debug_assert!(!self.closed, "operation on closed raster");
        debug_assert!(self.write_mode, "set on a read-only raster");
        debug_assert!(
            self.grid.contains(x, y),
            "pixel ({x}, {y}) outside {}x{} raster",
            self.grid.width(),
            self.grid.height()
        );

        let block_index = self.grid.block_index(x, y);
        if !self.cache.contains(block_index) {
            self.load_block(block_index);
        }
        let idx = self.grid.cell_index(block_index, x, y);
        self.cache.get_mut(block_index).expect("block resident after load")[idx] = value;
        if self.write_mode {
            self.dirty.insert(block_index);
        }
    }

    /// Flush dirty blocks, release all buffers, and close the band.
    ///
    /// Idempotent. After the first call, no other operation on this raster
    /// has defined behavior.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        while let Some((block_index, buffer)) = self.cache.pop_lru() {
            self.write_back(block_index, buffer);
        }
        debug_assert!(self.dirty.is_empty(), "dirty block was not resident");

        if let Some(mut band) = self.band.take() {
            if let Err(error) = band.close() {
                tracing::error!(%error, "closing raster band failed");
            }
        }
    }

    /// Read a block's window from disk and insert it into the cache,
    /// flushing whatever the insertion evicts.
    fn load_block(&mut self, block_index: usize) {
        let window = self.grid.window(block_index);
        let mut buffer = vec![0.0; window.len()];

        let band = self.band.as_mut().expect("raster closed");
        if let Err(error) = band.read_window(window, &mut buffer) {
            tracing::error!(block_index, %error, "block read failed");
            self.failures.push(IoFailure {
                block_index,
                direction: IoDirection::Read,
                error,
            });
        }

        if let Some((evicted_index, evicted)) = self.cache.put(block_index, buffer) {
            self.write_back(evicted_index, evicted);
        }
    }

    /// Write `buffer` back to its window if the block is dirty, then drop it.
    fn write_back(&mut self, block_index: usize, buffer: Vec<f64>) {
        if !self.write_mode || !self.dirty.remove(&block_index) {
            return;
        }
        let window = self.grid.window(block_index);
        let band = self.band.as_mut().expect("raster closed");
        if let Err(error) = band.write_window(window, &buffer) {
            tracing::error!(block_index, %error, "block write failed");
            self.failures.push(IoFailure {
                block_index,
                direction: IoDirection::Write,
                error,
            });
        }
    }

    /// Raster width in pixels.
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    /// Raster height in pixels.
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    /// Block decomposition of the raster, for callers that partition work
    /// blockwise.
    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// The band's nodata value, if one is set.
    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// Whether `value` matches the band's nodata value (NaN-aware).
    pub fn is_nodata(&self, value: f64) -> bool {
        self.nodata.is_some_and(|nd| is_close(value, nd))
    }

    /// Affine geotransform of the dataset.
    pub fn geo_transform(&self) -> GeoTransform {
        self.geotransform
    }

    /// Whether the raster accepts writes.
    pub fn write_mode(&self) -> bool {
        self.write_mode
    }

    /// Whether [`close`](ManagedRaster::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of blocks currently resident in the cache.
    pub fn resident_blocks(&self) -> usize {
        self.cache.len()
    }

    /// Number of resident blocks that differ from disk.
    pub fn dirty_blocks(&self) -> usize {
        self.dirty.len()
    }

    /// Block transfer failures recorded so far, oldest first.
    pub fn io_failures(&self) -> &[IoFailure] {
        &self.failures
    }
}

impl<B: TiledBand> Drop for ManagedRaster<B> {
    fn drop(&mut self) {
        self.close();
    }
}
