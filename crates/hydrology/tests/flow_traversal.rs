//! Integration tests for flow-direction traversal over the cached substrate.

use approx::assert_relative_eq;
use flowgrid_core::io::{MemoryBand, MemoryDataset};
use flowgrid_core::raster::ManagedRaster;
use flowgrid_hydrology::direction::REVERSE;
use flowgrid_hydrology::{
    outflow_sum, outflow_weight, D8, FlowDirRaster, FlowScheme, Mfd, Neighbor,
};

fn flow_raster<S: FlowScheme>(width: usize, height: usize) -> FlowDirRaster<S, MemoryBand> {
    let dataset = MemoryDataset::new(width, height, 4, 4);
    FlowDirRaster::new(ManagedRaster::new(dataset.band(1).unwrap(), true).unwrap())
}

#[test]
fn test_local_high_point_mfd() {
    let mut raster = flow_raster::<Mfd>(3, 3);

    // all-zero field: nothing flows anywhere
    assert!(raster.is_local_high_point(1, 1));

    // west neighbor flows east (nibble 0 = 1), straight into the center
    raster.set(0, 1, 0x0000_0001 as f64);
    assert!(!raster.is_local_high_point(1, 1));
}

#[test]
fn test_local_high_point_d8() {
    let mut raster = flow_raster::<D8>(3, 3);

    // mark every cell as "no direction" so the default zeros (= east) don't
    // fake inflow
    for y in 0..3 {
        for x in 0..3 {
            raster.set(x, y, 255.0);
        }
    }
    assert!(raster.is_local_high_point(1, 1));

    // north neighbor (direction 2 from the center) flows south, back into
    // the center
    raster.set(1, 0, f64::from(REVERSE[2]));
    assert!(!raster.is_local_high_point(1, 1));
}

#[test]
fn test_local_high_point_skips_nodata_neighbors() {
    let dataset = MemoryDataset::new(3, 3, 4, 4);
    dataset.set_nodata(Some(-9999.0));
    let mut raster: FlowDirRaster<Mfd, MemoryBand> =
        FlowDirRaster::new(ManagedRaster::new(dataset.band(1).unwrap(), true).unwrap());

    // a nodata neighbor never counts as inflow, whatever its bit pattern
    raster.set(0, 1, -9999.0);
    assert!(raster.is_local_high_point(1, 1));
}

#[test]
fn test_downslope_mfd_scenario() {
    let mut raster = flow_raster::<Mfd>(5, 5);

    // nibble 1 = 2, nibble 2 = 1
    raster.set(2, 2, 0x0000_0120 as f64);

    let out: Vec<Neighbor> = raster.downslope_neighbors(2, 2).collect();
    assert_eq!(out.len(), 2);

    assert_eq!(out[0].direction, 1);
    assert_eq!((out[0].x, out[0].y), (3, 1));
    assert_eq!(out[0].proportion, 2.0);

    assert_eq!(out[1].direction, 2);
    assert_eq!((out[1].x, out[1].y), (2, 1));
    assert_eq!(out[1].proportion, 1.0);
}

#[test]
fn test_downslope_d8_edge_pixel_has_no_neighbors() {
    let mut raster = flow_raster::<D8>(5, 5);

    // corner pixel pointed west, off the raster
    raster.set(0, 0, 4.0);
    assert_eq!(raster.downslope_neighbors(0, 0).count(), 0);

    // the no-skip variant still yields it, out-of-bounds coordinates and all
    let out: Vec<Neighbor> = raster.downslope_neighbors_no_skip(0, 0).collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].direction, 4);
    assert_eq!((out[0].x, out[0].y), (-1, 0));
}

#[test]
fn test_upslope_normalization() {
    let mut raster = flow_raster::<Mfd>(4, 3);

    // east neighbor of (1, 1): weight 4 east, weight 1 west (back toward
    // the center)
    raster.set(2, 1, 0x0000_0014 as f64);

    let out: Vec<Neighbor> = raster.upslope_neighbors(1, 1).collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].direction, 0);
    assert_eq!((out[0].x, out[0].y), (2, 1));
    assert_relative_eq!(out[0].proportion, 1.0 / 5.0);

    let raw: Vec<Neighbor> = raster.upslope_neighbors_no_divide(1, 1).collect();
    assert_eq!(raw.len(), 1);
    assert_eq!(raw[0].direction, 0);
    assert_eq!(raw[0].proportion, 1.0);
}

#[test]
fn test_upslope_d8() {
    let mut raster = flow_raster::<D8>(3, 3);
    for y in 0..3 {
        for x in 0..3 {
            raster.set(x, y, 255.0);
        }
    }
    // southwest neighbor (direction 5 from the center) flows northeast
    raster.set(0, 2, f64::from(REVERSE[5]));

    let out: Vec<Neighbor> = raster.upslope_neighbors(1, 1).collect();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].direction, 5);
    assert_eq!((out[0].x, out[0].y), (0, 2));
    assert_eq!(out[0].proportion, 1.0);
}

#[test]
fn test_all_neighbors_totality() {
    let mut raster = flow_raster::<Mfd>(8, 8);
    raster.set(4, 4, 0x1234_5678 as f64);

    let out: Vec<Neighbor> = raster.neighbors(4, 4).collect();
    assert_eq!(out.len(), 8);
    let directions: Vec<u8> = out.iter().map(|n| n.direction).collect();
    assert_eq!(directions, [0, 1, 2, 3, 4, 5, 6, 7]);

    // the same holds at a corner: the all-variant ignores bounds
    assert_eq!(raster.neighbors(0, 0).count(), 8);
}

/// If the center sends weight `w` toward a neighbor, the neighbor sees the
/// center upslope with proportion `w / sum(center)`.
#[test]
fn test_downslope_upslope_duality() {
    let width = 8;
    let height = 8;
    let mut raster = flow_raster::<Mfd>(width, height);

    // deterministic pseudo-random 32-bit flow field
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    for y in 0..height {
        for x in 0..width {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            raster.set(x, y, (state >> 32) as u32 as f64);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let center_value = raster.get(x, y) as i64;
            let downslope: Vec<Neighbor> = raster.downslope_neighbors(x, y).collect();
            for n in downslope {
                let weight = outflow_weight(center_value, n.direction);
                assert_eq!(n.proportion, weight as f64);

                let back = REVERSE[n.direction as usize];
                let upslope: Vec<Neighbor> =
                    raster.upslope_neighbors(n.x as usize, n.y as usize).collect();
                let matching: Vec<&Neighbor> =
                    upslope.iter().filter(|u| u.direction == back).collect();
                assert_eq!(matching.len(), 1, "missing upslope mate at ({}, {})", n.x, n.y);
                assert_eq!((matching[0].x, matching[0].y), (x as isize, y as isize));
                assert_relative_eq!(
                    matching[0].proportion,
                    weight as f64 / outflow_sum(center_value) as f64
                );
            }
        }
    }
}

/// Iteration reads neighbors through the cache, so it works unchanged when
/// the flow field spans many blocks.
#[test]
fn test_traversal_across_block_boundaries() {
    let dataset = MemoryDataset::new(128, 128, 32, 32);

    // a two-block cache forces evictions while the iterator is stepping
    let mut raster: FlowDirRaster<Mfd, MemoryBand> = FlowDirRaster::new(
        ManagedRaster::with_cache_capacity(dataset.band(1).unwrap(), true, 2).unwrap(),
    );

    // pixel on a block corner, all eight neighbors in different blocks or
    // block rows
    let (x, y) = (32, 32);
    raster.set(x - 1, y, 0x0000_0001 as f64); // west neighbor flows east
    raster.set(x, y - 1, 0x0100_0000 as f64); // north neighbor flows south

    let upslope: Vec<Neighbor> = raster.upslope_neighbors(x, y).collect();
    let directions: Vec<u8> = upslope.iter().map(|n| n.direction).collect();
    assert_eq!(directions, [2, 4]);
}
