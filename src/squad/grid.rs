//! Formation grid coordinate system
//!
//! Grid cells are integer (x, y) pairs. Grid x maps to world x and grid y
//! maps to world z; the vertical axis is never part of a grid offset.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::squad::constants::DEFAULT_CELL_SIZE;

/// Integer cell in a formation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise minimum
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl std::ops::Sub for GridCell {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for GridCell {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl From<[i32; 2]> for GridCell {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<GridCell> for [i32; 2] {
    fn from(cell: GridCell) -> Self {
        [cell.x, cell.y]
    }
}

/// Converts between grid cells and horizontal world offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    cell_size: f32,
}

impl GridMapper {
    pub fn new(cell_size: f32) -> Self {
        Self { cell_size }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// World offset of a grid cell (y component is always 0)
    pub fn grid_to_world(&self, cell: GridCell) -> Vec3 {
        Vec3::new(
            cell.x as f32 * self.cell_size,
            0.0,
            cell.y as f32 * self.cell_size,
        )
    }

    /// Nearest grid cell to a world offset, ignoring the vertical axis
    pub fn world_to_grid(&self, offset: Vec3) -> GridCell {
        GridCell::new(
            (offset.x / self.cell_size).round() as i32,
            (offset.z / self.cell_size).round() as i32,
        )
    }

    /// Quantize an arbitrary offset onto the grid
    pub fn snap_to_grid(&self, offset: Vec3) -> Vec3 {
        self.grid_to_world(self.world_to_grid(offset))
    }
}

impl Default for GridMapper {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}
