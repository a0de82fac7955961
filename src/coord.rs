use std::ops::{Add, AddAssign};

/// A (column, row) pair on a rectangular board. `x` is the column, `y` the row.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    #[inline]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance to `other` (king-move distance).
    #[inline]
    pub fn king_distance(self, other: Coord) -> i16 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Unit step from `self` towards `other`, one component per axis.
    #[inline]
    pub fn step_towards(self, other: Coord) -> Coord {
        Coord::new((other.x - self.x).signum(), (other.y - self.y).signum())
    }
}

impl Add for Coord {
    type Output = Coord;

    #[inline]
    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Coord {
    #[inline]
    fn add_assign(&mut self, rhs: Coord) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

pub const KING_STEPS: [Coord; 8] = [
    Coord { x: -1, y: -1 },
    Coord { x: -1, y: 0 },
    Coord { x: -1, y: 1 },
    Coord { x: 0, y: -1 },
    Coord { x: 0, y: 1 },
    Coord { x: 1, y: -1 },
    Coord { x: 1, y: 0 },
    Coord { x: 1, y: 1 },
];

pub const KNIGHT_JUMPS: [Coord; 8] = [
    Coord { x: 1, y: 2 },
    Coord { x: 2, y: 1 },
    Coord { x: -1, y: 2 },
    Coord { x: -2, y: 1 },
    Coord { x: 1, y: -2 },
    Coord { x: 2, y: -1 },
    Coord { x: -1, y: -2 },
    Coord { x: -2, y: -1 },
];

pub const ROOK_DIRS: [Coord; 4] = [
    Coord { x: 1, y: 0 },
    Coord { x: -1, y: 0 },
    Coord { x: 0, y: 1 },
    Coord { x: 0, y: -1 },
];

pub const BISHOP_DIRS: [Coord; 4] = [
    Coord { x: 1, y: 1 },
    Coord { x: 1, y: -1 },
    Coord { x: -1, y: 1 },
    Coord { x: -1, y: -1 },
];

pub const QUEEN_DIRS: [Coord; 8] = [
    Coord { x: 1, y: 0 },
    Coord { x: -1, y: 0 },
    Coord { x: 0, y: 1 },
    Coord { x: 0, y: -1 },
    Coord { x: 1, y: 1 },
    Coord { x: 1, y: -1 },
    Coord { x: -1, y: 1 },
    Coord { x: -1, y: -1 },
];
