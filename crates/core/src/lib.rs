//! # flowgrid Core
//!
//! Block-cached raster access for hydrological analysis over tiled terrain
//! data whose extent may far exceed memory.
//!
//! This crate provides:
//! - `ManagedRaster`: pixel-level reads and writes over a tiled band,
//!   amortized into whole-block I/O through a bounded LRU cache with
//!   dirty-block write-back
//! - `BlockCache` / `BlockGrid`: the cache and block geometry underneath it
//! - `TiledBand`: the narrow interface consumed from the underlying raster
//!   library, with GDAL (`gdal` feature) and in-memory implementations

pub mod cache;
pub mod error;
pub mod io;
pub mod raster;

pub use cache::BlockCache;
pub use error::{Error, Result};
pub use io::TiledBand;
pub use raster::{BlockGrid, BlockWindow, GeoTransform, ManagedRaster};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::io::{MemoryDataset, TiledBand};
    pub use crate::raster::{GeoTransform, ManagedRaster};
}
