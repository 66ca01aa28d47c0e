//! In-memory tiled datasets.
//!
//! Buffer-backed stand-in for a disk raster, with no filesystem dependency.
//! A [`MemoryDataset`] hands out band handles over shared storage, so a band
//! "reopened" from the same dataset observes everything an earlier managed
//! raster flushed. The write-back tests rely on exactly that.

use ndarray::{s, Array2};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::io::TiledBand;
use crate::raster::{BlockWindow, GeoTransform};

struct Store {
    width: usize,
    height: usize,
    block_xsize: usize,
    block_ysize: usize,
    nodata: Option<f64>,
    geotransform: GeoTransform,
    // one (height, width) array per band
    bands: Vec<Array2<f64>>,
}

impl Store {
    fn check_window(&self, window: BlockWindow, buffer_len: usize) -> Result<()> {
        if window.xoff + window.xsize > self.width || window.yoff + window.ysize > self.height {
            return Err(Error::WindowOutOfBounds {
                xoff: window.xoff,
                yoff: window.yoff,
                xsize: window.xsize,
                ysize: window.ysize,
                width: self.width,
                height: self.height,
            });
        }
        if buffer_len != window.len() {
            return Err(Error::BufferSizeMismatch {
                expected: window.len(),
                actual: buffer_len,
            });
        }
        Ok(())
    }
}

/// An in-memory multi-band tiled dataset.
///
/// Handles are cheap clones over shared storage. Bands follow GDAL's
/// 1-based numbering.
#[derive(Clone)]
pub struct MemoryDataset {
    store: Arc<Mutex<Store>>,
}

impl MemoryDataset {
    /// Create a single-band dataset of zeros.
    pub fn new(width: usize, height: usize, block_xsize: usize, block_ysize: usize) -> Self {
        Self::with_bands(width, height, block_xsize, block_ysize, 1)
    }

    /// Create a dataset with `n_bands` bands of zeros.
    pub fn with_bands(
        width: usize,
        height: usize,
        block_xsize: usize,
        block_ysize: usize,
        n_bands: usize,
    ) -> Self {
        let bands = (0..n_bands).map(|_| Array2::zeros((height, width))).collect();
        Self {
            store: Arc::new(Mutex::new(Store {
                width,
                height,
                block_xsize,
                block_ysize,
                nodata: None,
                geotransform: GeoTransform::default(),
                bands,
            })),
        }
    }

    /// Create a single-band dataset from existing data.
    pub fn from_array(data: Array2<f64>, block_xsize: usize, block_ysize: usize) -> Self {
        let (height, width) = data.dim();
        Self {
            store: Arc::new(Mutex::new(Store {
                width,
                height,
                block_xsize,
                block_ysize,
                nodata: None,
                geotransform: GeoTransform::default(),
                bands: vec![data],
            })),
        }
    }

    /// Set the nodata value reported by every band.
    pub fn set_nodata(&self, nodata: Option<f64>) {
        self.store.lock().unwrap().nodata = nodata;
    }

    /// Set the dataset geotransform.
    pub fn set_geo_transform(&self, geotransform: GeoTransform) {
        self.store.lock().unwrap().geotransform = geotransform;
    }

    /// Number of bands.
    pub fn band_count(&self) -> usize {
        self.store.lock().unwrap().bands.len()
    }

    /// Open band `band_index` (1-based, GDAL convention).
    pub fn band(&self, band_index: usize) -> Result<MemoryBand> {
        let count = self.band_count();
        if band_index < 1 || band_index > count {
            return Err(Error::InvalidBandIndex {
                band: band_index,
                count,
            });
        }
        Ok(MemoryBand {
            store: Arc::clone(&self.store),
            band_index,
        })
    }
}

/// One band of a [`MemoryDataset`].
pub struct MemoryBand {
    store: Arc<Mutex<Store>>,
    band_index: usize,
}

impl TiledBand for MemoryBand {
    fn raster_size(&self) -> (usize, usize) {
        let store = self.store.lock().unwrap();
        (store.width, store.height)
    }

    fn block_size(&self) -> (usize, usize) {
        let store = self.store.lock().unwrap();
        (store.block_xsize, store.block_ysize)
    }

    fn nodata(&self) -> Option<f64> {
        self.store.lock().unwrap().nodata
    }

    fn geo_transform(&self) -> GeoTransform {
        self.store.lock().unwrap().geotransform
    }

    fn read_window(&mut self, window: BlockWindow, out: &mut [f64]) -> Result<()> {
        let store = self.store.lock().unwrap();
        store.check_window(window, out.len())?;

        let band = &store.bands[self.band_index - 1];
        for row in 0..window.ysize {
            let src = band.slice(s![
                window.yoff + row,
                window.xoff..window.xoff + window.xsize
            ]);
            let dst = &mut out[row * window.xsize..(row + 1) * window.xsize];
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = *s;
            }
        }
        Ok(())
    }

    fn write_window(&mut self, window: BlockWindow, data: &[f64]) -> Result<()> {
        let mut store = self.store.lock().unwrap();
        store.check_window(window, data.len())?;

        let band = &mut store.bands[self.band_index - 1];
        for row in 0..window.ysize {
            let mut dst = band.slice_mut(s![
                window.yoff + row,
                window.xoff..window.xoff + window.xsize
            ]);
            let src = &data[row * window.xsize..(row + 1) * window.xsize];
            for (d, s) in dst.iter_mut().zip(src.iter()) {
                *d = *s;
            }
        }
        Ok(())
    }
}
