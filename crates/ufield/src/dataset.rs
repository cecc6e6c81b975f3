//! Dataset: a grid coupled with a data array.
//!
//! The dataset holds no interpolation logic of its own. A query localizes the
//! position on the grid, fetches the eight cell vertex values through the
//! array's access policy and hands them to [`interpolate`]. Swapping the grid
//! variant or the policy never touches this module.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use rayon::prelude::*;
use tracing::trace;

use crate::array::AbstractDataArray;
use crate::error::GridError;
use crate::grid::{CellLocator, Grid, CELL_VERTICES};
use crate::interpolate::{interpolate, Interpolant};

/// Values of type `T` over a grid.
pub struct Dataset<T> {
    grid: Arc<Grid>,
    data: Arc<dyn AbstractDataArray<T>>,
}

impl<T> Clone for Dataset<T> {
    fn clone(&self) -> Self {
        Self {
            grid: Arc::clone(&self.grid),
            data: Arc::clone(&self.data),
        }
    }
}

impl<T> fmt::Debug for Dataset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("grid", &self.grid)
            .field("len", &self.data.len())
            .finish()
    }
}

impl<T> Dataset<T> {
    /// Couple `grid` with `data`.
    ///
    /// # Errors
    /// [`GridError::SizeMismatch`] if the array does not hold one value per
    /// grid vertex.
    pub fn new(grid: Arc<Grid>, data: Arc<dyn AbstractDataArray<T>>) -> Result<Self, GridError> {
        let expected = grid.vertex_count();
        let found = data.len();
        if expected != found {
            return Err(GridError::SizeMismatch { expected, found });
        }
        Ok(Self { grid, data })
    }

    /// Build from owned parts.
    ///
    /// # Errors
    /// See [`Dataset::new`].
    pub fn from_parts<A>(grid: impl Into<Grid>, data: A) -> Result<Self, GridError>
    where
        A: AbstractDataArray<T> + 'static,
    {
        Self::new(Arc::new(grid.into()), Arc::new(data))
    }

    /// A dataset over the same grid with a different array.
    ///
    /// # Errors
    /// See [`Dataset::new`].
    pub fn with_array<U>(
        &self,
        data: Arc<dyn AbstractDataArray<U>>,
    ) -> Result<Dataset<U>, GridError> {
        Dataset::new(Arc::clone(&self.grid), data)
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    /// The data array.
    #[must_use]
    pub fn array(&self) -> &Arc<dyn AbstractDataArray<T>> {
        &self.data
    }

    /// Vertex counts along x, y and z.
    #[must_use]
    pub fn dimension(&self) -> [usize; 3] {
        self.grid.dimension()
    }

    /// Value stored at lattice vertex `(i, j, k)`.
    ///
    /// # Errors
    /// [`GridError::IndexOutOfRange`] naming the first index that exceeds its
    /// axis.
    pub fn at_comp(&self, i: usize, j: usize, k: usize) -> Result<T, GridError> {
        let [nx, ny, nz] = self.grid.dimension();
        for (index, len) in [(i, nx), (j, ny), (k, nz)] {
            if index >= len {
                return Err(GridError::out_of_range(index, len));
            }
        }
        self.data.get_item(i + j * nx + k * nx * ny)
    }
}

impl<T: Interpolant> Dataset<T> {
    /// Interpolated value at a physical position.
    ///
    /// # Errors
    /// [`GridError::OutOfBounds`] if the position is outside the grid; the
    /// array is not read in that case.
    pub fn at_phys(&self, position: Vec3) -> Result<T, GridError> {
        let info = match self.grid.phys_to_cell(position) {
            Ok(info) => info,
            Err(e) => {
                trace!(%position, error = %e, "point query failed");
                return Err(e);
            }
        };
        let cell = info.cell.ok_or(GridError::OutOfBounds { position })?;
        let vertices = self.grid.cell_vertices(cell)?;

        let mut values = Vec::with_capacity(CELL_VERTICES);
        for vertex in vertices {
            values.push(self.data.get_item(vertex)?);
        }
        Ok(interpolate(&info.weights, &values))
    }

    /// Answer many point queries in parallel; results keep input order.
    #[must_use]
    pub fn at_phys_many(&self, positions: &[Vec3]) -> Vec<Result<T, GridError>>
    where
        T: Send,
    {
        positions.par_iter().map(|&p| self.at_phys(p)).collect()
    }
}
