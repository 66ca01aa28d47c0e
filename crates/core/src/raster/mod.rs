//! Raster geometry and cached access

mod blocks;
mod geotransform;
mod managed;

pub use blocks::{BlockGrid, BlockWindow};
pub use geotransform::GeoTransform;
pub use managed::{
    is_close, IoDirection, IoFailure, ManagedRaster, DEFAULT_BLOCK_CAPACITY,
};
