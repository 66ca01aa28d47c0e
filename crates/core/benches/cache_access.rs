//! Benchmarks for cached raster access patterns

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flowgrid_core::io::{MemoryBand, MemoryDataset};
use flowgrid_core::raster::ManagedRaster;

fn create_raster(size: usize) -> ManagedRaster<MemoryBand> {
    let dataset = MemoryDataset::new(size, size, 64, 64);
    let mut raster = ManagedRaster::new(dataset.band(1).unwrap(), true).unwrap();
    for y in 0..size {
        for x in 0..size {
            raster.set(x, y, ((x * 7 + y * 13) % 17) as f64);
        }
    }
    raster
}

fn bench_sequential_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("managed_raster/sequential_sweep");
    for size in [256, 512, 1024] {
        let mut raster = create_raster(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut sum = 0.0;
                for y in 0..size {
                    for x in 0..size {
                        sum += raster.get(black_box(x), black_box(y));
                    }
                }
                sum
            })
        });
    }
    group.finish();
}

fn bench_random_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("managed_raster/random_access");
    for size in [256, 512, 1024] {
        let mut raster = create_raster(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            // simple LCG so the access pattern is deterministic
            b.iter(|| {
                let mut state: u64 = 0x2545_f491_4f6c_dd1d;
                let mut sum = 0.0;
                for _ in 0..10_000 {
                    state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                    let x = (state >> 33) as usize % size;
                    let y = (state >> 17) as usize % size;
                    sum += raster.get(black_box(x), black_box(y));
                }
                sum
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sequential_sweep, bench_random_access);
criterion_main!(benches);
