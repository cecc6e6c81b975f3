//! Regular cartesian grid.
//!
//! Vertices are uniformly spaced along each axis, so localization is pure
//! arithmetic: a physical position is mapped to computational space with
//! `(position - min) * mapping_factor`, the integer part names the cell and the
//! fractional part is the local coordinate inside it. No search is involved.
//!
//! Vertices and cells are numbered row-major with x fastest, then y, then z.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::grid::{step_size, CellLocator, CellType, PointInfo, CELL_VERTICES};
use crate::interpolate::trilinear_weights;
use crate::{Bounds, TimeBounds};

/// How positions on the max faces of the padded box are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryMode {
    /// Max faces are inside; such points land in the last cell with local
    /// coordinate 1.0 on that axis.
    #[default]
    Inclusive,
    /// Max faces are outside and fail with `OutOfBounds`.
    Exclusive,
}

/// Configuration for a [`RegularCartesianGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularGridConfig {
    /// Vertex counts along x, y, z
    pub dimensions: [usize; 3],
    /// Padded bounding box; defaults to a unit-spaced lattice at the origin
    pub bounds: Option<Bounds>,
    /// Real (ghost-exclusive) bounding box; defaults to the padded box
    pub real_bounds: Option<Bounds>,
    /// Time window of the real bounding box
    pub time_bounds: TimeBounds,
    /// Treatment of the max faces
    pub boundary_mode: BoundaryMode,
}

impl Default for RegularGridConfig {
    fn default() -> Self {
        Self {
            dimensions: [2, 2, 2],
            bounds: None,
            real_bounds: None,
            time_bounds: TimeBounds::default(),
            boundary_mode: BoundaryMode::default(),
        }
    }
}

impl RegularGridConfig {
    /// Create a config with the given vertex counts and default geometry.
    #[must_use]
    pub fn with_dimensions(x: usize, y: usize, z: usize) -> Self {
        Self {
            dimensions: [x, y, z],
            ..Default::default()
        }
    }

    /// Set the padded bounding box.
    #[must_use]
    pub fn bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.bounds = Some(Bounds::from_min_max(min, max));
        self
    }

    /// Set the real bounding box and its time window.
    #[must_use]
    pub fn real_bounds(mut self, bounds: Bounds, time: TimeBounds) -> Self {
        self.real_bounds = Some(bounds);
        self.time_bounds = time;
        self
    }

    /// Set the boundary mode.
    #[must_use]
    pub fn boundary_mode(mut self, mode: BoundaryMode) -> Self {
        self.boundary_mode = mode;
        self
    }
}

/// Axis-aligned lattice with uniform spacing per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularCartesianGrid {
    dimensions: [usize; 3],
    bounds: Bounds,
    real_bounds: Bounds,
    time_bounds: TimeBounds,
    /// Physical → computational scale per axis
    mapping_factor: Vec3,
    /// Computational → physical scale per axis (the grid spacing)
    spacing: Vec3,
    min_spacing: f32,
    boundary_mode: BoundaryMode,
}

impl RegularCartesianGrid {
    /// Build a grid from a config.
    ///
    /// # Errors
    /// [`GridError::InvalidDimensions`] if an axis has fewer than two vertices
    /// or the vertex count does not fit in `usize`, [`GridError::InvalidBounds`]
    /// if a box is empty or the real box is not inside the padded box.
    pub fn new(config: RegularGridConfig) -> Result<Self, GridError> {
        let dimensions = config.dimensions;
        if dimensions.iter().any(|&n| n < 2) {
            return Err(GridError::InvalidDimensions { dimensions });
        }
        // Every index computed later is bounded by the vertex count
        let vertex_count = dimensions
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if vertex_count.is_none() {
            return Err(GridError::InvalidDimensions { dimensions });
        }

        let bounds = config
            .bounds
            .unwrap_or_else(|| Bounds::unit_lattice(dimensions));
        if !bounds.is_valid() {
            return Err(GridError::InvalidBounds(format!(
                "padded box {} .. {} has an empty axis",
                bounds.min, bounds.max
            )));
        }

        let real_bounds = config.real_bounds.unwrap_or(bounds);
        if !bounds.encloses(&real_bounds) {
            return Err(GridError::InvalidBounds(format!(
                "real box {} .. {} exceeds padded box {} .. {}",
                real_bounds.min, real_bounds.max, bounds.min, bounds.max
            )));
        }

        #[allow(clippy::cast_precision_loss)]
        let cells = Vec3::new(
            (dimensions[0] - 1) as f32,
            (dimensions[1] - 1) as f32,
            (dimensions[2] - 1) as f32,
        );
        let size = bounds.size();
        let mapping_factor = cells / size;
        let spacing = size / cells;

        Ok(Self {
            dimensions,
            bounds,
            real_bounds,
            time_bounds: config.time_bounds,
            mapping_factor,
            spacing,
            min_spacing: spacing.min_element(),
            boundary_mode: config.boundary_mode,
        })
    }

    /// Unit-spaced grid with its first vertex at the origin.
    ///
    /// # Errors
    /// [`GridError::InvalidDimensions`] if an axis has fewer than two vertices.
    pub fn with_dimensions(x: usize, y: usize, z: usize) -> Result<Self, GridError> {
        Self::new(RegularGridConfig::with_dimensions(x, y, z))
    }

    /// Grid spanning `min .. max`.
    ///
    /// # Errors
    /// See [`RegularCartesianGrid::new`].
    pub fn with_bounds(dimensions: [usize; 3], min: Vec3, max: Vec3) -> Result<Self, GridError> {
        Self::new(RegularGridConfig {
            dimensions,
            ..Default::default()
        }
        .bounds(min, max))
    }

    /// Physical → computational scale per axis.
    #[must_use]
    pub fn mapping_factor(&self) -> Vec3 {
        self.mapping_factor
    }

    /// Smallest spacing over all axes.
    #[must_use]
    pub fn min_spacing(&self) -> f32 {
        self.min_spacing
    }

    /// Treatment of the max faces.
    #[must_use]
    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary_mode
    }

    fn cells_per_axis(&self) -> [usize; 3] {
        self.dimensions.map(|n| n - 1)
    }

    fn check_cell(&self, cell: usize) -> Result<(), GridError> {
        let count = self.cell_count();
        if cell < count {
            Ok(())
        } else {
            Err(GridError::out_of_range(cell, count))
        }
    }

    fn accepts(&self, position: Vec3) -> bool {
        match self.boundary_mode {
            BoundaryMode::Inclusive => self.bounds.contains(position),
            BoundaryMode::Exclusive => self.bounds.contains_half_open(position),
        }
    }
}

impl CellLocator for RegularCartesianGrid {
    fn dimension(&self) -> [usize; 3] {
        self.dimensions
    }

    fn cell_type(&self) -> CellType {
        CellType::Cube
    }

    fn boundary(&self) -> Bounds {
        self.bounds
    }

    fn real_boundary(&self) -> (Bounds, TimeBounds) {
        (self.real_bounds, self.time_bounds)
    }

    fn at_vertex(&self, vertex: usize) -> Result<Vec3, GridError> {
        let count = self.vertex_count();
        if vertex >= count {
            return Err(GridError::out_of_range(vertex, count));
        }
        let [nx, ny, _] = self.dimensions;
        #[allow(clippy::cast_precision_loss)]
        let index = Vec3::new(
            (vertex % nx) as f32,
            ((vertex / nx) % ny) as f32,
            (vertex / (nx * ny)) as f32,
        );
        Ok(self.bounds.min + index * self.spacing)
    }

    fn phys_to_cell(&self, position: Vec3) -> Result<PointInfo, GridError> {
        if !self.accepts(position) {
            return Err(GridError::OutOfBounds { position });
        }

        let comp = (position - self.bounds.min) * self.mapping_factor;
        let cells = self.cells_per_axis();
        let mut index = [0usize; 3];
        let mut local = Vec3::ZERO;
        for axis in 0..3 {
            // comp >= 0 inside the box; clamp keeps max-face points in the last cell
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let i = (comp[axis].floor() as usize).min(cells[axis] - 1);
            index[axis] = i;
            #[allow(clippy::cast_precision_loss)]
            let frac = comp[axis] - i as f32;
            local[axis] = frac.clamp(0.0, 1.0);
        }

        let cell = index[0] + index[1] * cells[0] + index[2] * cells[0] * cells[1];
        Ok(PointInfo {
            position,
            cell: Some(cell),
            local,
            weights: trilinear_weights(local),
        })
    }

    fn cell_vertices(&self, cell: usize) -> Result<[usize; CELL_VERTICES], GridError> {
        self.check_cell(cell)?;
        let [cx, cy, _] = self.cells_per_axis();
        let [nx, ny, _] = self.dimensions;
        let (ix, iy, iz) = (cell % cx, (cell / cx) % cy, cell / (cx * cy));

        let base = ix + iy * nx + iz * nx * ny;
        let slab = nx * ny;
        Ok([
            base,
            base + 1,
            base + nx,
            base + nx + 1,
            base + slab,
            base + slab + 1,
            base + slab + nx,
            base + slab + nx + 1,
        ])
    }

    fn cell_volume(&self, cell: usize) -> Result<f64, GridError> {
        self.check_cell(cell)?;
        let s = self.spacing;
        Ok(f64::from(s.x) * f64::from(s.y) * f64::from(s.z))
    }

    fn grid_spacing(&self, cell: usize) -> Result<Vec3, GridError> {
        self.check_cell(cell)?;
        Ok(self.spacing)
    }

    fn is_in_bbox(&self, position: Vec3) -> bool {
        self.bounds.contains(position)
    }

    fn is_in_real_bbox(&self, position: Vec3) -> bool {
        self.real_bounds.contains(position)
    }

    fn is_in_real_bbox_at(&self, position: Vec3, t: f32) -> bool {
        self.real_bounds.contains(position) && self.time_bounds.contains(t)
    }

    fn is_in_cell(&self, position: Vec3, cell: usize) -> bool {
        let Ok(vertices) = self.cell_vertices(cell) else {
            return false;
        };
        match (
            self.at_vertex(vertices[0]),
            self.at_vertex(vertices[CELL_VERTICES - 1]),
        ) {
            (Ok(lo), Ok(hi)) => Bounds::from_min_max(lo, hi).contains(position),
            _ => false,
        }
    }

    fn boundary_intersection(&self, start: Vec3, end: Vec3, old_step: f32) -> (Vec3, f32) {
        if self.bounds.contains(end) {
            return (end, old_step);
        }

        let dir = end - start;
        let mut t_hit = 1.0_f32;
        for axis in 0..3 {
            if dir[axis] == 0.0 {
                continue;
            }
            let face = if end[axis] > self.bounds.max[axis] {
                self.bounds.max[axis]
            } else if end[axis] < self.bounds.min[axis] {
                self.bounds.min[axis]
            } else {
                continue;
            };
            t_hit = t_hit.min((face - start[axis]) / dir[axis]);
        }

        let crossing = start + dir * t_hit.clamp(0.0, 1.0);
        (crossing, step_size(crossing, start, end, old_step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(x: usize, y: usize, z: usize) -> RegularCartesianGrid {
        RegularCartesianGrid::with_dimensions(x, y, z).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_dimensions() {
        assert_eq!(
            RegularCartesianGrid::with_dimensions(1, 4, 4),
            Err(GridError::InvalidDimensions {
                dimensions: [1, 4, 4]
            })
        );
    }

    #[test]
    fn test_rejects_overflowing_vertex_count() {
        assert_eq!(
            RegularCartesianGrid::with_dimensions(4_000_000, 4_000_000, 4_000_000),
            Err(GridError::InvalidDimensions {
                dimensions: [4_000_000, 4_000_000, 4_000_000]
            })
        );
        assert!(RegularCartesianGrid::with_dimensions(usize::MAX, 2, 2).is_err());
        // Large but representable
        let g = grid(1 << 20, 2, 2);
        assert_eq!(g.vertex_count(), 1 << 22);
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let flat =
            RegularCartesianGrid::with_bounds([3, 3, 3], Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0));
        assert!(matches!(flat, Err(GridError::InvalidBounds(_))));

        let config = RegularGridConfig::with_dimensions(3, 3, 3).real_bounds(
            Bounds::from_min_max(Vec3::ZERO, Vec3::splat(5.0)),
            TimeBounds::default(),
        );
        assert!(matches!(
            RegularCartesianGrid::new(config),
            Err(GridError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_default_geometry_is_unit_spaced() {
        let g = grid(10, 10, 10);
        assert_eq!(g.boundary().max, Vec3::splat(9.0));
        assert_eq!(g.mapping_factor(), Vec3::ONE);
        assert_eq!(g.grid_spacing(0).unwrap(), Vec3::ONE);
        assert_eq!(g.min_spacing(), 1.0);
        assert_eq!(g.cell_volume(0).unwrap(), 1.0);
    }

    #[test]
    fn test_anisotropic_spacing() {
        let g = RegularCartesianGrid::with_bounds(
            [3, 5, 2],
            Vec3::new(-1.0, 0.0, 10.0),
            Vec3::new(1.0, 2.0, 13.0),
        )
        .unwrap();
        assert_eq!(g.grid_spacing(0).unwrap(), Vec3::new(1.0, 0.5, 3.0));
        assert_eq!(g.min_spacing(), 0.5);
        assert!((g.cell_volume(3).unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(g.at_vertex(14).unwrap(), Vec3::new(1.0, 2.0, 10.0));
    }

    #[test]
    fn test_at_vertex_row_major() {
        let g = grid(4, 3, 2);
        assert_eq!(g.at_vertex(0).unwrap(), Vec3::ZERO);
        assert_eq!(g.at_vertex(1).unwrap(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(g.at_vertex(4).unwrap(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(g.at_vertex(12).unwrap(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(g.at_vertex(23).unwrap(), Vec3::new(3.0, 2.0, 1.0));
        assert_eq!(g.at_vertex(24), Err(GridError::out_of_range(24, 24)));
    }

    #[test]
    fn test_cell_vertices_order() {
        let g = grid(4, 3, 2);
        // cell (1, 1, 0): base vertex 1 + 1*4 = 5
        let cell = 1 + 3;
        assert_eq!(
            g.cell_vertices(cell).unwrap(),
            [5, 6, 9, 10, 17, 18, 21, 22]
        );
        assert_eq!(g.cell_vertices(6), Err(GridError::out_of_range(6, 6)));
        assert!(g.cell_volume(6).is_err());
    }

    #[test]
    fn test_phys_to_cell_weights() {
        let g = grid(4, 4, 4);
        let info = g.phys_to_cell(Vec3::new(1.25, 2.5, 0.0)).unwrap();
        assert_eq!(info.cell, Some(1 + 2 * 3));
        assert_eq!(info.local, Vec3::new(0.25, 0.5, 0.0));
        let expected = [0.375, 0.125, 0.375, 0.125, 0.0, 0.0, 0.0, 0.0];
        for (w, e) in info.weights.iter().zip(expected) {
            assert!((w - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_outside_padded_box_fails() {
        let g = grid(4, 4, 4);
        for p in [
            Vec3::new(-0.01, 1.0, 1.0),
            Vec3::new(1.0, 3.01, 1.0),
            Vec3::new(1.0, 1.0, 100.0),
            Vec3::new(f32::NAN, 1.0, 1.0),
        ] {
            assert!(matches!(
                g.phys_to_cell(p),
                Err(GridError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_boundary_modes_on_max_face() {
        let face = Vec3::new(3.0, 1.5, 1.5);

        let inclusive = grid(4, 4, 4);
        let info = inclusive.phys_to_cell(face).unwrap();
        assert_eq!(info.local.x, 1.0);
        assert!(inclusive.is_in_cell(face, info.cell.unwrap()));

        let exclusive = RegularCartesianGrid::new(
            RegularGridConfig::with_dimensions(4, 4, 4).boundary_mode(BoundaryMode::Exclusive),
        )
        .unwrap();
        assert_eq!(
            exclusive.phys_to_cell(face),
            Err(GridError::OutOfBounds { position: face })
        );
        // Min faces stay inside either way
        assert!(exclusive.phys_to_cell(Vec3::ZERO).is_ok());
        // The bbox test itself is mode-independent
        assert!(exclusive.is_in_bbox(face));
    }

    #[test]
    fn test_real_bbox_with_ghost_layer() {
        let config = RegularGridConfig::with_dimensions(6, 6, 6).real_bounds(
            Bounds::from_min_max(Vec3::ONE, Vec3::splat(4.0)),
            TimeBounds::new(0.0, 10.0),
        );
        let g = RegularCartesianGrid::new(config).unwrap();
        let (real, window) = g.real_boundary();
        assert_eq!(real.max, Vec3::splat(4.0));
        assert_eq!(window, TimeBounds::new(0.0, 10.0));

        let ghost = Vec3::new(0.5, 2.0, 2.0);
        assert!(g.is_in_bbox(ghost));
        assert!(!g.is_in_real_bbox(ghost));
        assert!(g.phys_to_cell(ghost).is_ok());

        let interior = Vec3::splat(2.0);
        assert!(g.is_in_real_bbox(interior));
        assert!(g.is_in_real_bbox_at(interior, 5.0));
        assert!(!g.is_in_real_bbox_at(interior, 11.0));
    }

    #[test]
    fn test_boundary_intersection() {
        let g = grid(5, 5, 5);
        let start = Vec3::new(2.0, 2.0, 2.0);

        // End inside: nothing clipped
        let (p, step) = g.boundary_intersection(start, Vec3::new(3.0, 2.0, 2.0), 0.5);
        assert_eq!(p, Vec3::new(3.0, 2.0, 2.0));
        assert_eq!(step, 0.5);

        // Leaves through x = 4 halfway along the segment
        let (p, step) = g.boundary_intersection(start, Vec3::new(6.0, 3.0, 2.0), 1.0);
        assert!((p - Vec3::new(4.0, 2.5, 2.0)).length() < 1e-5);
        assert!((step - 0.5).abs() < 1e-5);

        // Two faces crossed: x = 4 at t = 0.25 comes before y = 0 at t = 0.5
        let (p, step) = g.boundary_intersection(start, Vec3::new(10.0, -2.0, 2.0), 1.0);
        assert!((p - Vec3::new(4.0, 1.0, 2.0)).length() < 1e-5);
        assert!((step - 0.25).abs() < 1e-5);
        assert!(g.is_in_bbox(p));
    }

    proptest! {
        #[test]
        fn prop_vertex_round_trip(
            nx in 2usize..7,
            ny in 2usize..7,
            nz in 2usize..7,
            seed in 0usize..10_000,
        ) {
            let g = RegularCartesianGrid::with_bounds(
                [nx, ny, nz],
                Vec3::new(-3.0, 0.5, 10.0),
                Vec3::new(4.0, 2.0, 12.5),
            ).unwrap();
            let v = seed % g.vertex_count();
            let pos = g.at_vertex(v).unwrap();
            let info = g.phys_to_cell(pos).unwrap();
            let vertices = g.cell_vertices(info.cell.unwrap()).unwrap();

            let (corner, weight) = info
                .weights
                .iter()
                .copied()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap();
            prop_assert!((weight - 1.0).abs() < 1e-4, "weight {}", weight);
            prop_assert_eq!(vertices[corner], v);
        }

        #[test]
        fn prop_inside_points_localize(
            x in 0.0f32..=9.0,
            y in 0.0f32..=4.0,
            z in 0.0f32..=2.0,
        ) {
            let g = RegularCartesianGrid::with_dimensions(10, 5, 3).unwrap();
            let p = Vec3::new(x, y, z);
            let info = g.phys_to_cell(p).unwrap();
            let cell = info.cell.unwrap();
            prop_assert!(g.is_in_cell(p, cell));
            let sum: f32 = info.weights.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-5);
        }

        #[test]
        fn prop_outside_points_rejected(
            x in 9.001f32..100.0,
            y in -50.0f32..50.0,
            z in -50.0f32..50.0,
        ) {
            let g = RegularCartesianGrid::with_dimensions(10, 10, 10).unwrap();
            let rejected = matches!(
                g.phys_to_cell(Vec3::new(x, y, z)),
                Err(GridError::OutOfBounds { .. })
            );
            prop_assert!(rejected);
        }
    }
}
