//! Grid snapping and cell-rectangle primitives shared by every stage.

use crate::types::GridPos;

/// Canonical snap: `floor((n + grid - 1) / grid) * grid`.
pub fn round_to_grid(value: f32, grid_size: i32) -> i32 {
    let grid = grid_size as f32;
    ((value + grid - 1.0) / grid).floor() as i32 * grid_size
}

/// Inclusive rectangle of grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub min: GridPos,
    pub max: GridPos,
}

impl CellRect {
    pub fn centered(center: GridPos, half_width: i32, half_height: i32) -> Self {
        Self {
            min: GridPos { x: center.x - half_width, y: center.y - half_height },
            max: GridPos { x: center.x + half_width, y: center.y + half_height },
        }
    }

    pub fn expanded(self, margin: i32) -> Self {
        Self { min: self.min.offset(-margin, -margin), max: self.max.offset(margin, margin) }
    }

    pub fn intersects(self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn contains(self, pos: GridPos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    pub fn is_border(self, pos: GridPos) -> bool {
        self.contains(pos)
            && (pos.x == self.min.x
                || pos.x == self.max.x
                || pos.y == self.min.y
                || pos.y == self.max.y)
    }

    pub fn cells(self) -> impl Iterator<Item = GridPos> {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| GridPos { x, y }))
    }
}
