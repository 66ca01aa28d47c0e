//! Error types for flowgrid

use thiserror::Error;

/// Main error type for flowgrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Band {band} is not a valid band number (raster has {count} bands)")]
    InvalidBandIndex { band: usize, count: usize },

    #[error("Block size {x}x{y} is not a power of two")]
    BlockSizeNotPowerOfTwo { x: usize, y: usize },

    #[error("Window {xoff},{yoff} {xsize}x{ysize} falls outside a {width}x{height} raster")]
    WindowOutOfBounds {
        xoff: usize,
        yoff: usize,
        xsize: usize,
        ysize: usize,
        width: usize,
        height: usize,
    },

    #[error("Buffer size mismatch: window holds {expected} cells, buffer holds {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("GDAL error: {0}")]
    #[cfg(feature = "gdal")]
    Gdal(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "gdal")]
impl From<gdal::errors::GdalError> for Error {
    fn from(e: gdal::errors::GdalError) -> Self {
        Error::Gdal(e.to_string())
    }
}

/// Result type alias for flowgrid operations
pub type Result<T> = std::result::Result<T, Error>;
