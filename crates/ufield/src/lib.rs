//! # ufield
//!
//! Point queries over volumetric fields on structured grids, where each grid
//! sample may be a probability distribution instead of a scalar.
//!
//! The same field can be queried two ways:
//!
//! - **Sample, then interpolate**: every vertex distribution is sampled and the
//!   eight scalars of the enclosing cell are interpolated.
//! - **Interpolate, then sample**: the eight vertex distributions are combined
//!   into a new distribution which the caller samples afterwards.
//!
//! Both go through one code path. A [`Dataset`] couples a [`Grid`] (geometry)
//! with an [`AbstractDataArray`] whose [`AccessPolicy`] decides whether stored
//! distributions are exposed as-is or sampled on access, and the
//! [`interpolate`] routine only needs the [`Interpolant`] arithmetic.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use glam::Vec3;
//! use ufield::{AsIs, DataArray, Dataset, Gaussian, Grid, RegularCartesianGrid, Sampled};
//!
//! let grid = Arc::new(Grid::from(RegularCartesianGrid::with_dimensions(10, 10, 10)?));
//! let storage: Arc<[Gaussian]> = vec![Gaussian::new(5.0, 1.0); 1000].into();
//!
//! // Interpolate distributions, sample afterwards
//! let dists: Dataset<Gaussian> =
//!     Dataset::new(grid.clone(), Arc::new(DataArray::new(storage.clone(), AsIs)))?;
//! let g = dists.at_phys(Vec3::new(0.5, 4.0, 4.0))?;
//!
//! // Sample every vertex, interpolate scalars
//! let values: Dataset<f32> =
//!     Dataset::new(grid, Arc::new(DataArray::new(storage, Sampled::seeded(42))))?;
//! let x = values.at_phys(Vec3::new(0.5, 4.0, 4.0))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod array;
pub mod dataset;
pub mod distribution;
pub mod error;
pub mod grid;
pub mod interpolate;
pub mod io;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use array::{
    AbstractDataArray, AccessPolicy, AsIs, DataArray, GeneralDataArray, Sampled, SampledDataArray,
};
pub use dataset::Dataset;
pub use distribution::{Gaussian, GaussianVec3, Sample};
pub use error::{DistributionError, GridError, LoadError};
pub use grid::regular::{BoundaryMode, RegularCartesianGrid, RegularGridConfig};
pub use grid::{step_size, CellLocator, CellType, Grid, PointInfo};
pub use interpolate::{interpolate, lerp, trilerp, Interpolant};
pub use io::{load_dataset, DatasetDescriptor, ItemPolicy, LoadedDataset};

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Bounds {
    /// Create bounds from min/max corners.
    #[must_use]
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Bounds spanning a lattice of `dimensions` vertices at unit spacing,
    /// starting at the origin.
    #[must_use]
    pub fn unit_lattice(dimensions: [usize; 3]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let max = Vec3::new(
            dimensions[0].saturating_sub(1) as f32,
            dimensions[1].saturating_sub(1) as f32,
            dimensions[2].saturating_sub(1) as f32,
        );
        Self { min: Vec3::ZERO, max }
    }

    /// Get the center of the bounds.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the bounds.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if a point is inside the bounds (faces included).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if a point is inside the bounds, excluding the max faces.
    #[must_use]
    pub fn contains_half_open(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x < self.max.x
            && point.y >= self.min.y
            && point.y < self.max.y
            && point.z >= self.min.z
            && point.z < self.max.z
    }

    /// Check if `other` lies entirely within these bounds.
    #[must_use]
    pub fn encloses(&self, other: &Bounds) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// True when every axis has a strictly positive extent.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let size = self.size();
        size.x > 0.0 && size.y > 0.0 && size.z > 0.0
    }
}

/// Closed time interval attached to the real (ghost-exclusive) bounds.
///
/// Animated boundaries restrict valid positions to a time window; the default
/// window is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBounds {
    /// Earliest valid time
    pub start: f32,
    /// Latest valid time
    pub end: f32,
}

impl TimeBounds {
    /// Create a time window.
    #[must_use]
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Check if `t` falls inside the window.
    #[must_use]
    pub fn contains(&self, t: f32) -> bool {
        t >= self.start && t <= self.end
    }
}

impl Default for TimeBounds {
    fn default() -> Self {
        Self {
            start: f32::NEG_INFINITY,
            end: f32::INFINITY,
        }
    }
}
