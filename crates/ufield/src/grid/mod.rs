//! Grid geometry: coordinate mapping, cell localization and boundary tests.
//!
//! Grids are a closed set of variants ([`Grid`]) behind one capability trait
//! ([`CellLocator`]). A [`Dataset`](crate::Dataset) only talks to the trait,
//! so adding a grid kind never touches the query path.

pub mod regular;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::{Bounds, TimeBounds};

pub use regular::{BoundaryMode, RegularCartesianGrid, RegularGridConfig};

/// Number of vertices of a hexahedral cell.
pub const CELL_VERTICES: usize = 8;

/// Shape of the grid's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    /// Triangle
    Triangle,
    /// Hexahedron with axis-aligned faces
    Cube,
    /// General polygon
    Polygon,
    /// Tetrahedron
    Tetrahedron,
}

/// Result of localizing a physical position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointInfo {
    /// Queried physical position
    pub position: Vec3,
    /// Enclosing cell, `None` when not found
    pub cell: Option<usize>,
    /// Local natural coordinates inside the cell, each in [0, 1]
    pub local: Vec3,
    /// Interpolation weight per cell vertex, in `cell_vertices` order
    pub weights: [f32; CELL_VERTICES],
}

impl PointInfo {
    /// An unresolved query for `position`.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            cell: None,
            local: Vec3::ZERO,
            weights: [0.0; CELL_VERTICES],
        }
    }

    /// Whether a cell was resolved.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.cell.is_some()
    }
}

/// Capabilities every grid variant provides.
pub trait CellLocator {
    /// Vertex counts along x, y and z.
    fn dimension(&self) -> [usize; 3];

    /// Shape of the grid's cells.
    fn cell_type(&self) -> CellType;

    /// Padded (ghost-inclusive) bounding box.
    fn boundary(&self) -> Bounds;

    /// Real (ghost-exclusive) bounding box and its valid time window.
    fn real_boundary(&self) -> (Bounds, TimeBounds);

    /// Physical position of a vertex.
    ///
    /// # Errors
    /// [`GridError::IndexOutOfRange`] for an invalid vertex index.
    fn at_vertex(&self, vertex: usize) -> Result<Vec3, GridError>;

    /// Locate the cell containing `position` and compute its weights.
    ///
    /// # Errors
    /// [`GridError::OutOfBounds`] when `position` lies outside the padded box.
    fn phys_to_cell(&self, position: Vec3) -> Result<PointInfo, GridError>;

    /// Vertex indices of a cell, in the order matching [`PointInfo::weights`].
    ///
    /// # Errors
    /// [`GridError::IndexOutOfRange`] for an invalid cell index.
    fn cell_vertices(&self, cell: usize) -> Result<[usize; CELL_VERTICES], GridError>;

    /// Volume of a cell.
    ///
    /// # Errors
    /// [`GridError::IndexOutOfRange`] for an invalid cell index.
    fn cell_volume(&self, cell: usize) -> Result<f64, GridError>;

    /// Grid spacing along each axis at a cell.
    ///
    /// # Errors
    /// [`GridError::IndexOutOfRange`] for an invalid cell index.
    fn grid_spacing(&self, cell: usize) -> Result<Vec3, GridError>;

    /// Whether `position` lies inside the padded bounding box.
    fn is_in_bbox(&self, position: Vec3) -> bool;

    /// Whether `position` lies inside the real bounding box.
    fn is_in_real_bbox(&self, position: Vec3) -> bool;

    /// Whether `position` lies inside the real bounding box at time `t`.
    fn is_in_real_bbox_at(&self, position: Vec3, t: f32) -> bool;

    /// Whether `position` lies inside `cell`.
    fn is_in_cell(&self, position: Vec3, cell: usize) -> bool;

    /// Where the segment `start → end` leaves the padded box, and `old_step`
    /// shortened so the crossing is not overshot.
    fn boundary_intersection(&self, start: Vec3, end: Vec3, old_step: f32) -> (Vec3, f32);

    /// Total number of vertices.
    fn vertex_count(&self) -> usize {
        self.dimension().iter().product()
    }

    /// Total number of cells.
    fn cell_count(&self) -> usize {
        self.dimension()
            .iter()
            .map(|n| n.saturating_sub(1))
            .product()
    }
}

/// The grid variants a dataset can be built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Grid {
    /// Uniformly spaced axis-aligned lattice.
    RegularCartesian(RegularCartesianGrid),
}

impl From<RegularCartesianGrid> for Grid {
    fn from(grid: RegularCartesianGrid) -> Self {
        Self::RegularCartesian(grid)
    }
}

impl Grid {
    fn locator(&self) -> &dyn CellLocator {
        match self {
            Grid::RegularCartesian(g) => g,
        }
    }
}

impl CellLocator for Grid {
    fn dimension(&self) -> [usize; 3] {
        self.locator().dimension()
    }

    fn cell_type(&self) -> CellType {
        self.locator().cell_type()
    }

    fn boundary(&self) -> Bounds {
        self.locator().boundary()
    }

    fn real_boundary(&self) -> (Bounds, TimeBounds) {
        self.locator().real_boundary()
    }

    fn at_vertex(&self, vertex: usize) -> Result<Vec3, GridError> {
        self.locator().at_vertex(vertex)
    }

    fn phys_to_cell(&self, position: Vec3) -> Result<PointInfo, GridError> {
        self.locator().phys_to_cell(position)
    }

    fn cell_vertices(&self, cell: usize) -> Result<[usize; CELL_VERTICES], GridError> {
        self.locator().cell_vertices(cell)
    }

    fn cell_volume(&self, cell: usize) -> Result<f64, GridError> {
        self.locator().cell_volume(cell)
    }

    fn grid_spacing(&self, cell: usize) -> Result<Vec3, GridError> {
        self.locator().grid_spacing(cell)
    }

    fn is_in_bbox(&self, position: Vec3) -> bool {
        self.locator().is_in_bbox(position)
    }

    fn is_in_real_bbox(&self, position: Vec3) -> bool {
        self.locator().is_in_real_bbox(position)
    }

    fn is_in_real_bbox_at(&self, position: Vec3, t: f32) -> bool {
        self.locator().is_in_real_bbox_at(position, t)
    }

    fn is_in_cell(&self, position: Vec3, cell: usize) -> bool {
        self.locator().is_in_cell(position, cell)
    }

    fn boundary_intersection(&self, start: Vec3, end: Vec3, old_step: f32) -> (Vec3, f32) {
        self.locator().boundary_intersection(start, end, old_step)
    }
}

/// Step size that covers `p1 → p` when a full step of `old_step` covers `p1 → p2`.
#[must_use]
pub fn step_size(p: Vec3, p1: Vec3, p2: Vec3, old_step: f32) -> f32 {
    let full = p1.distance(p2);
    if full == 0.0 {
        return 0.0;
    }
    old_step * p1.distance(p) / full
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_info_starts_unresolved() {
        let info = PointInfo::new(Vec3::ONE);
        assert!(!info.is_found());
        assert_eq!(info.weights, [0.0; 8]);
    }

    #[test]
    fn test_grid_enum_delegates() {
        let regular = RegularCartesianGrid::with_dimensions(3, 4, 5).unwrap();
        let grid = Grid::from(regular.clone());
        assert_eq!(grid.dimension(), [3, 4, 5]);
        assert_eq!(grid.vertex_count(), 60);
        assert_eq!(grid.cell_count(), 24);
        assert_eq!(grid.cell_type(), CellType::Cube);
        assert_eq!(
            grid.phys_to_cell(Vec3::new(1.5, 1.5, 1.5)),
            regular.phys_to_cell(Vec3::new(1.5, 1.5, 1.5))
        );
    }

    #[test]
    fn test_step_size_fraction() {
        let p1 = Vec3::ZERO;
        let p2 = Vec3::new(4.0, 0.0, 0.0);
        assert!((step_size(Vec3::new(1.0, 0.0, 0.0), p1, p2, 2.0) - 0.5).abs() < 1e-6);
        assert_eq!(step_size(p1, p1, p1, 2.0), 0.0);
    }
}
