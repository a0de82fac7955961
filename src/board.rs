use serde::{Deserialize, Serialize};

use crate::coord::Coord;

/// Largest supported board edge. Square indices are stored as `u8`-sized offsets.
pub const MAX_EDGE: u8 = 16;

/// Axis of a board reflection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Reflection {
    /// Mirror the files: column `x` maps to `cols - 1 - x`.
    Horizontal,
    /// Mirror the ranks: row `y` maps to `rows - 1 - y`.
    Vertical,
}

/// A rectangular board flattened row-major.
///
/// Square `0` is the bottom-left corner (column 0, row 0); index `row * cols + col`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct BoardGeometry {
    pub rows: u8,
    pub cols: u8,
}

impl BoardGeometry {
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    /// The standard 8x8 board.
    pub const fn standard() -> Self {
        Self::new(8, 8)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// The coordinate for a square index.
    #[inline]
    pub fn coord_of(&self, sq: usize) -> Coord {
        let cols = self.cols as usize;
        Coord::new((sq % cols) as i16, (sq / cols) as i16)
    }

    /// Returns the square index for this coordinate if it is on the board.
    #[inline]
    pub fn sq_of(&self, c: Coord) -> Option<usize> {
        if c.x < 0 || c.y < 0 || c.x >= self.cols as i16 || c.y >= self.rows as i16 {
            return None;
        }
        Some(c.y as usize * self.cols as usize + c.x as usize)
    }

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        self.sq_of(c).is_some()
    }

    /// Image of `sq` under a reflection.
    pub fn reflect_sq(&self, sq: usize, axis: Reflection) -> usize {
        let c = self.coord_of(sq);
        let image = match axis {
            Reflection::Horizontal => Coord::new(self.cols as i16 - 1 - c.x, c.y),
            Reflection::Vertical => Coord::new(c.x, self.rows as i16 - 1 - c.y),
        };
        image.y as usize * self.cols as usize + image.x as usize
    }

    /// Squares whose column lies in the left half (middle file included).
    pub fn in_left_half(&self, sq: usize) -> bool {
        let c = self.coord_of(sq);
        (c.x as usize) < (self.cols as usize).div_ceil(2)
    }

    /// Squares whose row lies in the lower half (middle rank included).
    pub fn in_lower_half(&self, sq: usize) -> bool {
        let c = self.coord_of(sq);
        (c.y as usize) < (self.rows as usize).div_ceil(2)
    }
}
