//! Tiled raster band I/O

#[cfg(feature = "gdal")]
mod gdal_io;
mod memory;

#[cfg(feature = "gdal")]
pub use gdal_io::GdalBand;

// Buffer-based band (always available, no filesystem dependency)
pub use memory::{MemoryBand, MemoryDataset};

use crate::error::Result;
use crate::raster::{BlockWindow, GeoTransform};

/// The interface the cache layer consumes from an underlying raster library.
///
/// A `TiledBand` is one opened band of a tiled raster: it reports geometry
/// and metadata, and moves whole edge-clipped windows of `f64` cells between
/// the backing store and caller-provided buffers. Read and write surface a
/// single error kind with no partial-success semantics.
pub trait TiledBand {
    /// Raster dimensions as `(width, height)` in pixels.
    fn raster_size(&self) -> (usize, usize);

    /// Nominal block dimensions as `(xsize, ysize)`.
    fn block_size(&self) -> (usize, usize);

    /// The band's nodata value, if one is set.
    fn nodata(&self) -> Option<f64>;

    /// Affine geotransform of the dataset.
    fn geo_transform(&self) -> GeoTransform;

    /// Read `window` into `out`: exactly `window.len()` cells, row-major
    /// with stride `window.xsize`.
    fn read_window(&mut self, window: BlockWindow, out: &mut [f64]) -> Result<()>;

    /// Write `window` from `data` (same layout as
    /// [`read_window`](TiledBand::read_window)).
    fn write_window(&mut self, window: BlockWindow, data: &[f64]) -> Result<()>;

    /// Flush backend-side state. Called once by the owning raster's close;
    /// the handle itself is released when the band is dropped.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
