use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use ufield::{AsIs, CellLocator, DataArray, Dataset, Gaussian, Grid, RegularCartesianGrid, Sampled};

fn grid(n: usize) -> Arc<Grid> {
    Arc::new(Grid::from(RegularCartesianGrid::with_dimensions(n, n, n).unwrap()))
}

fn positions(count: usize, extent: f32) -> Vec<Vec3> {
    // Deterministic low-discrepancy walk through the box
    (0..count)
        .map(|i| {
            let t = i as f32;
            Vec3::new(
                (t * 0.618_034).fract(),
                (t * 0.414_214).fract(),
                (t * 0.732_051).fract(),
            ) * extent
        })
        .collect()
}

fn bench_interpolate_distributions(c: &mut Criterion) {
    let grid = grid(64);
    let storage: Arc<[Gaussian]> = vec![Gaussian::new(5.0, 1.0); grid.vertex_count()].into();
    let ds = Dataset::<Gaussian>::new(grid, Arc::new(DataArray::new(storage, AsIs))).unwrap();
    let points = positions(1024, 63.0);

    c.bench_function("at_phys_gaussian", |b| {
        b.iter(|| {
            for &p in &points {
                black_box(ds.at_phys(black_box(p)).unwrap());
            }
        })
    });
}

fn bench_sample_then_interpolate(c: &mut Criterion) {
    let grid = grid(64);
    let storage: Arc<[Gaussian]> = vec![Gaussian::new(5.0, 1.0); grid.vertex_count()].into();
    let data = Arc::new(DataArray::new(storage, Sampled::seeded(42)));
    let ds = Dataset::<f32>::new(grid, data).unwrap();
    let points = positions(1024, 63.0);

    c.bench_function("at_phys_sampled", |b| {
        b.iter(|| {
            for &p in &points {
                black_box(ds.at_phys(black_box(p)).unwrap());
            }
        })
    });
}

fn bench_batch_queries(c: &mut Criterion) {
    let grid = grid(128);
    let values: Vec<f32> = (0..grid.vertex_count()).map(|v| (v % 97) as f32).collect();
    let ds = Dataset::<f32>::new(grid, Arc::new(DataArray::from_vec(values, AsIs))).unwrap();
    let points = positions(65_536, 127.0);

    c.bench_function("at_phys_many_scalar", |b| {
        b.iter(|| black_box(ds.at_phys_many(black_box(&points))))
    });
}

criterion_group!(
    benches,
    bench_interpolate_distributions,
    bench_sample_then_interpolate,
    bench_batch_queries
);
criterion_main!(benches);
