//! Dataset construction from descriptor files.

use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use tracing::{debug, info};

use super::descriptor::{DatasetDescriptor, ItemPolicy};
use super::raw::{load_gaussian_raw_array, load_vec3_gaussian_raw_array};
use crate::array::{AsIs, DataArray, Sampled};
use crate::dataset::Dataset;
use crate::distribution::{Gaussian, GaussianVec3};
use crate::error::LoadError;
use crate::grid::{CellLocator, Grid, RegularCartesianGrid};

/// A dataset whose element type is decided by the descriptor.
#[derive(Debug, Clone)]
pub enum LoadedDataset {
    /// Scalar Gaussians, interpolated as distributions.
    Gaussian(Dataset<Gaussian>),
    /// Scalar Gaussians, sampled per vertex on access.
    Sampled(Dataset<f32>),
    /// Vector Gaussians, interpolated as distributions.
    GaussianVec3(Dataset<GaussianVec3>),
    /// Vector Gaussians, sampled per vertex on access.
    SampledVec3(Dataset<Vec3>),
}

impl LoadedDataset {
    /// Vertex counts along x, y and z.
    #[must_use]
    pub fn dimension(&self) -> [usize; 3] {
        self.grid().dimension()
    }

    /// The shared grid.
    #[must_use]
    pub fn grid(&self) -> &Arc<Grid> {
        match self {
            Self::Gaussian(ds) => ds.grid(),
            Self::Sampled(ds) => ds.grid(),
            Self::GaussianVec3(ds) => ds.grid(),
            Self::SampledVec3(ds) => ds.grid(),
        }
    }

    /// Short name of the variant, for logs and messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gaussian(_) => "gaussian",
            Self::Sampled(_) => "sampled",
            Self::GaussianVec3(_) => "gaussian_vec3",
            Self::SampledVec3(_) => "sampled_vec3",
        }
    }
}

fn sampling(seed: Option<u64>) -> Sampled {
    seed.map_or_else(Sampled::from_entropy, Sampled::seeded)
}

/// Load the dataset described by the file at `path`.
///
/// Bare file names in the descriptor are resolved against the descriptor's
/// directory. `policy` overrides the descriptor's own `policy` key.
///
/// # Errors
/// Any [`LoadError`]; no dataset is returned on failure.
pub fn load_dataset(path: &Path, policy: Option<ItemPolicy>) -> Result<LoadedDataset, LoadError> {
    let mut descriptor = DatasetDescriptor::from_path(path)?;
    if let Some(dir) = path.parent() {
        descriptor.resolve_paths(dir);
    }
    descriptor.validate()?;
    let policy = match policy {
        Some(policy) => policy,
        None => descriptor.item_policy()?,
    };

    debug!(
        mfile = %descriptor.mfile.display(),
        sfile = %descriptor.sfile.display(),
        "resolved raw files"
    );

    let [x, y, z] = descriptor.dimensions();
    let grid = Arc::new(Grid::from(RegularCartesianGrid::with_dimensions(x, y, z)?));
    let len = grid.vertex_count();

    let dataset = if descriptor.tuples == 3 {
        let storage: Arc<[GaussianVec3]> =
            load_vec3_gaussian_raw_array(&descriptor.mfile, &descriptor.sfile, len)?.into();
        match policy {
            ItemPolicy::Raw => LoadedDataset::GaussianVec3(Dataset::<GaussianVec3>::new(
                grid,
                Arc::new(DataArray::new(storage, AsIs)),
            )?),
            ItemPolicy::Sampled { seed } => LoadedDataset::SampledVec3(Dataset::<Vec3>::new(
                grid,
                Arc::new(DataArray::new(storage, sampling(seed))),
            )?),
        }
    } else {
        let storage: Arc<[Gaussian]> =
            load_gaussian_raw_array(&descriptor.mfile, &descriptor.sfile, len)?.into();
        match policy {
            ItemPolicy::Raw => LoadedDataset::Gaussian(Dataset::<Gaussian>::new(
                grid,
                Arc::new(DataArray::new(storage, AsIs)),
            )?),
            ItemPolicy::Sampled { seed } => LoadedDataset::Sampled(Dataset::<f32>::new(
                grid,
                Arc::new(DataArray::new(storage, sampling(seed))),
            )?),
        }
    };

    info!(
        path = %path.display(),
        dims = ?descriptor.dimensions(),
        tuples = descriptor.tuples,
        kind = dataset.kind(),
        "dataset loaded"
    );
    Ok(dataset)
}

/// Build a Gaussian dataset on a unit-spaced lattice of `dimensions` from a
/// mean file and a standard-deviation file.
///
/// # Errors
/// Any grid construction or raw read error.
pub fn load_regular_gaussian_grid(
    mean_file: &Path,
    std_file: &Path,
    dimensions: [usize; 3],
) -> Result<Dataset<Gaussian>, LoadError> {
    let [x, y, z] = dimensions;
    let grid = Arc::new(Grid::from(RegularCartesianGrid::with_dimensions(x, y, z)?));
    let storage = load_gaussian_raw_array(mean_file, std_file, grid.vertex_count())?;
    let data = Arc::new(DataArray::from_vec(storage, AsIs));
    Ok(Dataset::<Gaussian>::new(grid, data)?)
}

/// Load a scalar Gaussian dataset that interpolates distributions.
///
/// # Errors
/// Any [`LoadError`], or [`LoadError::Configuration`] if the descriptor holds
/// vector data.
pub fn load_gaussian_dataset(path: &Path) -> Result<Dataset<Gaussian>, LoadError> {
    match load_dataset(path, Some(ItemPolicy::Raw))? {
        LoadedDataset::Gaussian(ds) => Ok(ds),
        other => Err(LoadError::config(format!(
            "expected a scalar gaussian dataset, found {}",
            other.kind()
        ))),
    }
}

/// Load a scalar Gaussian dataset that samples every vertex on access.
///
/// # Errors
/// Any [`LoadError`], or [`LoadError::Configuration`] if the descriptor holds
/// vector data.
pub fn load_gaussian_sampling_dataset(
    path: &Path,
    seed: Option<u64>,
) -> Result<Dataset<f32>, LoadError> {
    match load_dataset(path, Some(ItemPolicy::Sampled { seed }))? {
        LoadedDataset::Sampled(ds) => Ok(ds),
        other => Err(LoadError::config(format!(
            "expected a scalar gaussian dataset, found {}",
            other.kind()
        ))),
    }
}
