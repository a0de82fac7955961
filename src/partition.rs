use std::ops::Range;

use crate::error::{Result, TablebaseError};
use crate::pieces::PieceLabel;
use crate::position::Position;

/// Maps positions to one of `parts` owners by where the tracked piece stands.
///
/// The square index space `0..squares` is cut into `parts` contiguous ranges of
/// `ceil(squares / parts)` squares each; trailing ranges may be empty when there are more
/// parts than squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partitioner {
    tracked: PieceLabel,
    squares: usize,
    parts: usize,
    chunk: usize,
}

impl Partitioner {
    pub fn new(tracked: PieceLabel, squares: usize, parts: usize) -> Result<Self> {
        if parts == 0 {
            return Err(TablebaseError::invalid("partition count must be at least 1"));
        }
        if squares == 0 {
            return Err(TablebaseError::invalid("cannot partition an empty board"));
        }
        Ok(Self {
            tracked,
            squares,
            parts,
            chunk: squares.div_ceil(parts),
        })
    }

    #[inline]
    pub fn tracked(&self) -> PieceLabel {
        self.tracked
    }

    #[inline]
    pub fn parts(&self) -> usize {
        self.parts
    }

    /// The squares owned by `part`.
    pub fn range(&self, part: usize) -> Range<usize> {
        let start = (part * self.chunk).min(self.squares);
        let end = ((part + 1) * self.chunk).min(self.squares);
        start..end
    }

    #[inline]
    pub fn owner_of_square(&self, sq: usize) -> usize {
        (sq / self.chunk).min(self.parts - 1)
    }

    /// Owner of a position: the part holding the tracked piece's (first) square.
    ///
    /// A position without the tracked piece belongs to part 0.
    pub fn owner<A>(&self, pos: &Position<A>) -> usize {
        pos.square_of(self.tracked)
            .map(|sq| self.owner_of_square(sq))
            .unwrap_or(0)
    }
}
