//! Coarse raster of the vision union, used by the fog composite.
//!
//! Each cell stores 1 when its center is inside any vision circle and 0 when
//! fogged. Row 0 is the top of the map (largest world Y), matching panel
//! orientation.

use bevy::math::DVec2;
use bevy::prelude::Resource;

use crate::projection::MapBounds;
use crate::vision::{is_visible, VisionCircle};

pub const FOGGED: u8 = 0;
pub const REVEALED: u8 = 1;

#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct FogMask {
    columns: u32,
    rows: u32,
    cells: Vec<u8>,
}

impl FogMask {
    /// Sample the circles at every cell center over `bounds` on both axes.
    pub fn rasterize(
        circles: &[VisionCircle],
        bounds: MapBounds,
        columns: u32,
        rows: u32,
    ) -> Self {
        let mut cells = Vec::with_capacity(columns as usize * rows as usize);
        for row in 0..rows {
            for column in 0..columns {
                let center = cell_center(bounds, columns, rows, column, row);
                cells.push(if is_visible(center.x, center.y, circles) {
                    REVEALED
                } else {
                    FOGGED
                });
            }
        }
        Self {
            columns,
            rows,
            cells,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    fn index(&self, column: u32, row: u32) -> Option<usize> {
        if column < self.columns && row < self.rows {
            Some(row as usize * self.columns as usize + column as usize)
        } else {
            None
        }
    }

    pub fn get(&self, column: u32, row: u32) -> Option<u8> {
        self.index(column, row).and_then(|idx| self.cells.get(idx).copied())
    }

    pub fn is_revealed(&self, column: u32, row: u32) -> bool {
        self.get(column, row) == Some(REVEALED)
    }

    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == REVEALED).count()
    }

    /// Fraction of revealed cells, 0 for an empty mask.
    pub fn coverage(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.visible_count() as f64 / self.cells.len() as f64
        }
    }

    /// Row-major cell bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns = 0;
        self.rows = 0;
        self.cells.clear();
    }
}

/// World position at the center of a mask cell.
pub fn cell_center(bounds: MapBounds, columns: u32, rows: u32, column: u32, row: u32) -> DVec2 {
    let cell_w = bounds.span() / columns as f64;
    let cell_h = bounds.span() / rows as f64;
    DVec2::new(
        bounds.min + (column as f64 + 0.5) * cell_w,
        bounds.max - (row as f64 + 0.5) * cell_h,
    )
}
