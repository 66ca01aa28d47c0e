//! GDAL-backed tiled band access

use gdal::raster::Buffer;
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use std::path::Path;

use crate::error::{Error, Result};
use crate::io::TiledBand;
use crate::raster::{BlockWindow, GeoTransform};

/// One band of a GDAL dataset opened for block-level access.
///
/// Geometry and metadata are captured at open time; window transfers go
/// through `RasterIO` as `f64` regardless of the band's storage type.
pub struct GdalBand {
    dataset: Dataset,
    band_index: usize,
    raster_size: (usize, usize),
    block_size: (usize, usize),
    nodata: Option<f64>,
    geotransform: GeoTransform,
}

impl GdalBand {
    /// Open `path` and bind band `band_index` (1-based, GDAL convention).
    pub fn open<P: AsRef<Path>>(path: P, band_index: usize, write_mode: bool) -> Result<Self> {
        let dataset = if write_mode {
            Dataset::open_ex(
                path.as_ref(),
                DatasetOptions {
                    open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_RASTER,
                    ..Default::default()
                },
            )?
        } else {
            Dataset::open(path.as_ref())?
        };

        let count = dataset.raster_count();
        if band_index < 1 || band_index > count {
            return Err(Error::InvalidBandIndex {
                band: band_index,
                count,
            });
        }

        let raster_size = dataset.raster_size();
        let geotransform = dataset
            .geo_transform()
            .map(GeoTransform::from_gdal)
            .unwrap_or_default();

        let band = dataset.rasterband(band_index)?;
        let block_size = band.block_size();
        let nodata = band.no_data_value();
        drop(band);

        Ok(Self {
            dataset,
            band_index,
            raster_size,
            block_size,
            nodata,
            geotransform,
        })
    }
}

impl TiledBand for GdalBand {
    fn raster_size(&self) -> (usize, usize) {
        self.raster_size
    }

    fn block_size(&self) -> (usize, usize) {
        self.block_size
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn geo_transform(&self) -> GeoTransform {
        self.geotransform
    }

    fn read_window(&mut self, window: BlockWindow, out: &mut [f64]) -> Result<()> {
        let band = self.dataset.rasterband(self.band_index)?;
        let buffer = band.read_as::<f64>(
            (window.xoff as isize, window.yoff as isize),
            (window.xsize, window.ysize),
            (window.xsize, window.ysize),
            None,
        )?;
        if buffer.data().len() != out.len() {
            return Err(Error::BufferSizeMismatch {
                expected: out.len(),
                actual: buffer.data().len(),
            });
        }
        out.copy_from_slice(buffer.data());
        Ok(())
    }

    fn write_window(&mut self, window: BlockWindow, data: &[f64]) -> Result<()> {
        let mut band = self.dataset.rasterband(self.band_index)?;
        let mut buffer = Buffer::new((window.xsize, window.ysize), data.to_vec());
        band.write(
            (window.xoff as isize, window.yoff as isize),
            (window.xsize, window.ysize),
            &mut buffer,
        )?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.dataset.flush_cache()?;
        Ok(())
    }
}
