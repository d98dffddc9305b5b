//! Super-cell grid geometry of one local domain partition.
//!
//! The local partition is a grid of super-cells, surrounded by guard
//! super-cells that hold copies of neighbor data. Only core super-cells
//! (guards excluded) carry particles that radiate in this partition.

use serde::{Deserialize, Serialize};

use crate::error::{RadiationError, Result};
use crate::vector::Float3;

/// Number of spatial dimensions of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimensionality {
    /// Two dimensions (x, y); z is ignored.
    Two,
    /// Three dimensions.
    Three,
}

impl Dimensionality {
    /// Number of spatial axes.
    pub const fn axes(&self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Super-cell coordinate in the local grid (guards included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SuperCellIdx(pub [u32; 3]);

impl SuperCellIdx {
    /// Create a super-cell index.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self([x, y, z])
    }
}

/// Mapping descriptor: super-cell layout, guard extent and cell size.
///
/// Deserialized mappings are validated like constructed ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMapping")]
pub struct SuperCellMapping {
    /// Cells per super-cell along each axis.
    pub super_cell_size: [u32; 3],
    /// Super-cells along each axis, guards included.
    pub grid_super_cells: [u32; 3],
    /// Guard super-cells on each side along each axis.
    pub guard_super_cells: [u32; 3],
    /// Physical cell extent [m].
    pub cell_size: Float3,
    /// Spatial dimensionality.
    pub dims: Dimensionality,
}

#[derive(Deserialize)]
struct RawMapping {
    super_cell_size: [u32; 3],
    grid_super_cells: [u32; 3],
    guard_super_cells: [u32; 3],
    cell_size: Float3,
    dims: Dimensionality,
}

impl TryFrom<RawMapping> for SuperCellMapping {
    type Error = RadiationError;

    fn try_from(raw: RawMapping) -> Result<Self> {
        let mapping = Self {
            super_cell_size: raw.super_cell_size,
            grid_super_cells: raw.grid_super_cells,
            guard_super_cells: raw.guard_super_cells,
            cell_size: raw.cell_size,
            dims: raw.dims,
        };
        mapping.validate()?;
        Ok(mapping)
    }
}

impl SuperCellMapping {
    /// Create a 3D mapping.
    pub fn new_3d(
        super_cell_size: [u32; 3],
        grid_super_cells: [u32; 3],
        guard_super_cells: [u32; 3],
        cell_size: Float3,
    ) -> Result<Self> {
        let mapping = Self {
            super_cell_size,
            grid_super_cells,
            guard_super_cells,
            cell_size,
            dims: Dimensionality::Three,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Create a 2D mapping. The z extent is one cell and one super-cell.
    pub fn new_2d(
        super_cell_size: [u32; 2],
        grid_super_cells: [u32; 2],
        guard_super_cells: [u32; 2],
        cell_size: [f64; 2],
    ) -> Result<Self> {
        let mapping = Self {
            super_cell_size: [super_cell_size[0], super_cell_size[1], 1],
            grid_super_cells: [grid_super_cells[0], grid_super_cells[1], 1],
            guard_super_cells: [guard_super_cells[0], guard_super_cells[1], 0],
            cell_size: Float3::new(cell_size[0], cell_size[1], 1.0),
            dims: Dimensionality::Two,
        };
        mapping.validate()?;
        Ok(mapping)
    }

    /// Check the layout: non-zero super-cells, guards that fit in the grid on
    /// both sides, positive cell size.
    pub fn validate(&self) -> Result<()> {
        for axis in 0..3 {
            if self.super_cell_size[axis] == 0 {
                return Err(RadiationError::invalid_config(format!(
                    "super-cell size along axis {} is zero",
                    axis
                )));
            }
            let both_sides = self.guard_super_cells[axis].checked_mul(2);
            if both_sides.map_or(true, |g| self.grid_super_cells[axis] < g) {
                return Err(RadiationError::invalid_config(format!(
                    "grid of {} super-cells along axis {} cannot hold {} guards per side",
                    self.grid_super_cells[axis], axis, self.guard_super_cells[axis]
                )));
            }
            if !self.cell_size[axis].is_finite() || self.cell_size[axis] <= 0.0 {
                return Err(RadiationError::invalid_config(format!(
                    "cell size along axis {} must be positive",
                    axis
                )));
            }
        }
        Ok(())
    }

    /// Cells per super-cell.
    pub fn cells_per_super_cell(&self) -> usize {
        self.super_cell_size.iter().map(|&s| s as usize).product()
    }

    /// Number of core super-cells along each axis.
    ///
    /// An axis whose guards do not fit in the grid has no core super-cells.
    pub fn core_extent(&self) -> [u32; 3] {
        let mut extent = [0u32; 3];
        for (axis, e) in extent.iter_mut().enumerate() {
            *e = self.guard_super_cells[axis]
                .checked_mul(2)
                .and_then(|g| self.grid_super_cells[axis].checked_sub(g))
                .unwrap_or(0);
        }
        extent
    }

    /// Number of core super-cells.
    pub fn core_super_cell_count(&self) -> usize {
        self.core_extent().iter().map(|&e| e as usize).product()
    }

    /// Check if a super-cell index lies inside the grid (guards included).
    pub fn contains(&self, idx: SuperCellIdx) -> bool {
        (0..3).all(|axis| idx.0[axis] < self.grid_super_cells[axis])
    }

    /// Linear index of a super-cell in the full grid, x fastest.
    pub fn linear_index(&self, idx: SuperCellIdx) -> Option<usize> {
        if !self.contains(idx) {
            return None;
        }
        let [gx, gy, _] = self.grid_super_cells;
        let [x, y, z] = idx.0;
        Some(x as usize + gx as usize * (y as usize + gy as usize * z as usize))
    }

    /// Core super-cells, x fastest. The upper bound is exclusive.
    pub fn core_super_cells(&self) -> impl Iterator<Item = SuperCellIdx> + '_ {
        let [ex, ey, ez] = self.core_extent();
        let guard = self.guard_super_cells;
        (0..ez).flat_map(move |z| {
            (0..ey).flat_map(move |y| {
                (0..ex).map(move |x| SuperCellIdx::new(x + guard[0], y + guard[1], z + guard[2]))
            })
        })
    }

    /// Cell coordinates inside a super-cell for a linear cell index.
    pub fn local_cell(&self, cell_index: u32) -> [u32; 3] {
        let [sx, sy, _] = self.super_cell_size;
        [cell_index % sx, (cell_index / sx) % sy, cell_index / (sx * sy)]
    }

    /// Total size of the local grid in cells, guards included.
    pub fn local_cells(&self) -> [u32; 3] {
        let mut cells = [0u32; 3];
        for (axis, c) in cells.iter_mut().enumerate() {
            *c = self.grid_super_cells[axis] * self.super_cell_size[axis];
        }
        cells
    }

    /// Global physical position of a particle.
    ///
    /// `global_offset` is the cell offset of this partition's first core cell
    /// in the global simulation domain. In 2D the z coordinate is zero.
    pub fn global_position(
        &self,
        super_cell: SuperCellIdx,
        cell_index: u32,
        in_cell: Float3,
        global_offset: [i64; 3],
    ) -> Float3 {
        let local = self.local_cell(cell_index);
        let mut pos = [0.0f64; 3];
        for axis in 0..self.dims.axes() {
            let cell = super_cell.0[axis] as i64 * self.super_cell_size[axis] as i64
                + local[axis] as i64
                - self.guard_super_cells[axis] as i64 * self.super_cell_size[axis] as i64
                + global_offset[axis];
            pos[axis] = (cell as f64 + in_cell[axis]) * self.cell_size[axis];
        }
        Float3::from(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> SuperCellMapping {
        SuperCellMapping::new_3d([8, 8, 4], [4, 3, 3], [1, 1, 1], Float3::splat(1.0e-6)).unwrap()
    }

    #[test]
    fn test_core_iteration_excludes_guards() {
        let m = mapping();
        let cells: Vec<_> = m.core_super_cells().collect();
        assert_eq!(cells.len(), 2);
        assert_eq!(m.core_super_cell_count(), 2);
        assert_eq!(cells[0], SuperCellIdx::new(1, 1, 1));
        assert_eq!(cells[1], SuperCellIdx::new(2, 1, 1));
    }

    #[test]
    fn test_local_cell_roundtrip() {
        let m = mapping();
        assert_eq!(m.cells_per_super_cell(), 256);
        assert_eq!(m.local_cell(0), [0, 0, 0]);
        assert_eq!(m.local_cell(9), [1, 1, 0]);
        assert_eq!(m.local_cell(64 + 3), [3, 0, 1]);
    }

    #[test]
    fn test_global_position() {
        let m = mapping();
        // First core super-cell, first cell, middle of the cell, no offset
        let pos = m.global_position(SuperCellIdx::new(1, 1, 1), 0, Float3::splat(0.5), [0; 3]);
        assert!((pos.x - 0.5e-6).abs() < 1e-18);
        assert!((pos.z - 0.5e-6).abs() < 1e-18);

        let shifted = m.global_position(SuperCellIdx::new(1, 1, 1), 0, Float3::ZERO, [16, 0, 0]);
        assert!((shifted.x - 16.0e-6).abs() < 1e-18);
    }

    #[test]
    fn test_2d_ignores_z() {
        let m = SuperCellMapping::new_2d([4, 4], [3, 3], [1, 1], [1.0, 2.0]).unwrap();
        assert_eq!(m.dims.axes(), 2);
        let pos = m.global_position(SuperCellIdx::new(1, 1, 0), 5, Float3::splat(0.5), [0; 3]);
        assert_eq!(pos.z, 0.0);
        assert!((pos.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_guard_extent() {
        let result = SuperCellMapping::new_3d([8, 8, 4], [1, 3, 3], [1, 1, 1], Float3::splat(1.0));
        assert!(matches!(result, Err(RadiationError::InvalidConfig(_))));
    }

    #[test]
    fn test_linear_index_out_of_range() {
        let m = mapping();
        assert_eq!(m.linear_index(SuperCellIdx::new(4, 0, 0)), None);
        assert_eq!(m.linear_index(SuperCellIdx::new(1, 1, 1)), Some(1 + 4 * (1 + 3)));
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "super_cell_size": [8, 8, 4],
            "grid_super_cells": [1, 1, 1],
            "guard_super_cells": [1, 1, 1],
            "cell_size": { "x": 1.0, "y": 1.0, "z": 1.0 },
            "dims": "Three"
        }"#;
        let err = serde_json::from_str::<SuperCellMapping>(json).unwrap_err();
        assert!(err.to_string().contains("guards"), "{}", err);

        let overflow = r#"{
            "super_cell_size": [8, 8, 4],
            "grid_super_cells": [4, 4, 4],
            "guard_super_cells": [4294967295, 1, 1],
            "cell_size": { "x": 1.0, "y": 1.0, "z": 1.0 },
            "dims": "Three"
        }"#;
        assert!(serde_json::from_str::<SuperCellMapping>(overflow).is_err());

        let m = mapping();
        let roundtrip: SuperCellMapping =
            serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
        assert_eq!(roundtrip.grid_super_cells, m.grid_super_cells);
        assert_eq!(roundtrip.guard_super_cells, m.guard_super_cells);
        assert!((roundtrip.cell_size.x / m.cell_size.x - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_core_extent_of_unchecked_mapping_is_empty() {
        let mut m = mapping();
        m.guard_super_cells = [3, 1, 1];
        assert!(m.validate().is_err());
        assert_eq!(m.core_extent(), [0, 1, 1]);
        assert_eq!(m.core_super_cells().count(), 0);

        m.guard_super_cells = [u32::MAX, 1, 1];
        assert_eq!(m.core_super_cell_count(), 0);
    }
}
