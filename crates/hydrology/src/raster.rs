//! Flow-direction rasters.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use flowgrid_core::io::TiledBand;
use flowgrid_core::raster::ManagedRaster;
use flowgrid_core::Result;

use crate::direction::{COL_OFFSETS, REVERSE, ROW_OFFSETS};
use crate::neighbors::{
    DownslopeNeighbors, DownslopeNeighborsNoSkip, Neighbors, Pixel, UpslopeNeighbors,
    UpslopeNeighborsNoDivide,
};
use crate::scheme::{outflow_weight, FlowScheme, SchemeKind};

/// A managed raster whose cell values encode flow directions under scheme
/// `S`.
///
/// Dereferences to the underlying [`ManagedRaster`], so `get`/`set`/`close`
/// and the metadata accessors are available directly. On top of those it
/// offers the neighbor iterator family and the local-high-point predicate
/// used by watershed and accumulation algorithms.
pub struct FlowDirRaster<S: FlowScheme, B: TiledBand> {
    raster: ManagedRaster<B>,
    _scheme: PhantomData<S>,
}

impl<S: FlowScheme, B: TiledBand> FlowDirRaster<S, B> {
    /// Interpret an already-managed raster as flow directions.
    pub fn new(raster: ManagedRaster<B>) -> Self {
        Self {
            raster,
            _scheme: PhantomData,
        }
    }

    /// Open `band` behind a fresh cache.
    pub fn from_band(band: B, write_mode: bool) -> Result<Self> {
        Ok(Self::new(ManagedRaster::new(band, write_mode)?))
    }

    /// Unwrap back into the underlying managed raster.
    pub fn into_inner(self) -> ManagedRaster<B> {
        self.raster
    }

    /// Snapshot the cell at `(x, y)` as a value-like pixel descriptor.
    pub fn pixel(&mut self, x: usize, y: usize) -> Pixel {
        let value = self.raster.get(x, y) as i64;
        Pixel::new(x as isize, y as isize, value)
    }

    /// All eight neighbors of `(x, y)`, in direction order.
    pub fn neighbors(&mut self, x: usize, y: usize) -> Neighbors {
        Neighbors::new(self.pixel(x, y))
    }

    /// In-bounds neighbors receiving flow from `(x, y)`.
    pub fn downslope_neighbors(&mut self, x: usize, y: usize) -> DownslopeNeighbors<S> {
        let pixel = self.pixel(x, y);
        DownslopeNeighbors::new(pixel, self.raster.width(), self.raster.height())
    }

    /// Neighbors receiving flow from `(x, y)`, including out-of-bounds ones.
    pub fn downslope_neighbors_no_skip(
        &mut self,
        x: usize,
        y: usize,
    ) -> DownslopeNeighborsNoSkip<S> {
        DownslopeNeighborsNoSkip::new(self.pixel(x, y))
    }

    /// In-bounds neighbors flowing into `(x, y)`, with normalized
    /// proportions.
    pub fn upslope_neighbors(&mut self, x: usize, y: usize) -> UpslopeNeighbors<'_, S, B> {
        let pixel = self.pixel(x, y);
        UpslopeNeighbors::new(self, pixel)
    }

    /// In-bounds neighbors flowing into `(x, y)`, with raw weights.
    pub fn upslope_neighbors_no_divide(
        &mut self,
        x: usize,
        y: usize,
    ) -> UpslopeNeighborsNoDivide<'_, S, B> {
        let pixel = self.pixel(x, y);
        UpslopeNeighborsNoDivide::new(self, pixel)
    }

    /// Whether `(x, y)` has no upslope neighbors.
    ///
    /// Nodata neighbors are treated as non-contributing: a cell ringed by
    /// nodata is a local high point.
    pub fn is_local_high_point(&mut self, x: usize, y: usize) -> bool {
        let width = self.raster.width() as isize;
        let height = self.raster.height() as isize;

        for d in 0..8u8 {
            let xj = x as isize + COL_OFFSETS[d as usize];
            let yj = y as isize + ROW_OFFSETS[d as usize];
            if xj < 0 || xj >= width || yj < 0 || yj >= height {
                continue;
            }
            let value = self.raster.get(xj as usize, yj as usize);
            if self.raster.is_nodata(value) {
                continue;
            }
            let back = REVERSE[d as usize];
            let flows_back = match S::KIND {
                SchemeKind::Single => value as i64 == i64::from(back),
                SchemeKind::Multi => outflow_weight(value as i64, back) != 0,
            };
            if flows_back {
                return false;
            }
        }
        true
    }
}

impl<S: FlowScheme, B: TiledBand> Deref for FlowDirRaster<S, B> {
    type Target = ManagedRaster<B>;

    fn deref(&self) -> &ManagedRaster<B> {
        &self.raster
    }
}

impl<S: FlowScheme, B: TiledBand> DerefMut for FlowDirRaster<S, B> {
    fn deref_mut(&mut self) -> &mut ManagedRaster<B> {
        &mut self.raster
    }
}
