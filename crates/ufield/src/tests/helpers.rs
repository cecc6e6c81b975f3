//! Fixture builders.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::array::{AsIs, DataArray, Sampled};
use crate::dataset::Dataset;
use crate::distribution::Gaussian;
use crate::grid::{CellLocator, Grid, RegularCartesianGrid};
use crate::io::write_raw;

/// Vertex count per axis of the scenario lattice (10 cells, spacing 1).
pub const SCENARIO_DIM: usize = 11;

/// Grid shared by both query paths.
pub fn scenario_grid() -> Arc<Grid> {
    let grid = RegularCartesianGrid::with_dimensions(SCENARIO_DIM, SCENARIO_DIM, SCENARIO_DIM)
        .expect("valid dimensions");
    Arc::new(grid.into())
}

/// Every vertex holds the same Gaussian.
pub fn constant_storage(grid: &Grid, dist: Gaussian) -> Arc<[Gaussian]> {
    vec![dist; grid.vertex_count()].into()
}

/// Datasets over one storage: distributions as-is and sampled on access.
pub fn paired_datasets(dist: Gaussian, seed: u64) -> (Dataset<Gaussian>, Dataset<f32>) {
    let grid = scenario_grid();
    let storage = constant_storage(&grid, dist);
    let raw = Dataset::<Gaussian>::new(
        Arc::clone(&grid),
        Arc::new(DataArray::new(Arc::clone(&storage), AsIs)),
    )
    .expect("sizes match");
    let sampled = Dataset::<f32>::new(
        grid,
        Arc::new(DataArray::new(storage, Sampled::seeded(seed))),
    )
    .expect("sizes match");
    (raw, sampled)
}

/// Sample mean and unbiased variance.
pub fn moments(values: &[f32]) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
    let var = values
        .iter()
        .map(|&v| (f64::from(v) - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    (mean, var)
}

/// Write `mean.raw`, `std.raw` and an INFO descriptor into `dir`.
///
/// `means`/`stds` hold `tuples` values per vertex. Returns the descriptor path.
pub fn write_fixture(
    dir: &Path,
    dims: [usize; 3],
    tuples: usize,
    means: &[f32],
    stds: &[f32],
    extra: &str,
) -> PathBuf {
    write_raw(&dir.join("mean.raw"), means).expect("write means");
    write_raw(&dir.join("std.raw"), stds).expect("write stds");
    let [x, y, z] = dims;
    let text = format!(
        "; test fixture\n\
         gtype regular\n\
         xdim {x}\nydim {y}\nzdim {z}\n\
         dtype gaussian\n\
         tuples {tuples}\n\
         mfile mean.raw\n\
         sfile std.raw\n\
         {extra}"
    );
    let path = dir.join("field.info");
    fs::write(&path, text).expect("write descriptor");
    path
}
