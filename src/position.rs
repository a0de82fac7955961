use crate::board::{BoardGeometry, Reflection};
use crate::pieces::{render_labels, PieceLabel, EMPTY};

/// Auxiliary payload for games that carry no state beyond the placement.
pub type NoAux = ();

/// A full board placement, the side to move, and game-specific auxiliary data.
///
/// Hash and equality cover every field, so positions that differ only in the side to
/// move (or in `aux`) are different keys everywhere in the solver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position<A = NoAux> {
    board: Box<[PieceLabel]>,
    /// `true` when the first (uppercase) player is to move.
    pub side_to_move: bool,
    pub aux: A,
}

impl<A> Position<A> {
    pub fn new(board: impl Into<Box<[PieceLabel]>>, side_to_move: bool, aux: A) -> Self {
        Self {
            board: board.into(),
            side_to_move,
            aux,
        }
    }

    /// An empty board of `squares` squares.
    pub fn empty(squares: usize, side_to_move: bool, aux: A) -> Self {
        Self::new(vec![EMPTY; squares], side_to_move, aux)
    }

    #[inline]
    pub fn board(&self) -> &[PieceLabel] {
        &self.board
    }

    #[inline]
    pub fn get(&self, sq: usize) -> PieceLabel {
        self.board[sq]
    }

    #[inline]
    pub fn set(&mut self, sq: usize, label: PieceLabel) {
        self.board[sq] = label;
    }

    /// Builder-style placement, mostly for tests and fixtures.
    pub fn with(mut self, sq: usize, label: PieceLabel) -> Self {
        self.set(sq, label);
        self
    }

    /// The first square (lowest index) holding `label`.
    pub fn square_of(&self, label: PieceLabel) -> Option<usize> {
        self.board.iter().position(|&l| l == label)
    }

    /// Occupied squares with their labels, in square order.
    pub fn pieces(&self) -> impl Iterator<Item = (usize, PieceLabel)> + '_ {
        self.board
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, l)| l != EMPTY)
    }

    pub fn piece_count(&self) -> usize {
        self.board.iter().filter(|&&l| l != EMPTY).count()
    }

    /// Rank-by-rank rendering, top rank first.
    pub fn render(&self, geometry: &BoardGeometry) -> String {
        let cols = geometry.cols as usize;
        let mut out = String::with_capacity(self.board.len() + geometry.rows as usize);
        for row in (0..geometry.rows as usize).rev() {
            out.push_str(&render_labels(&self.board[row * cols..(row + 1) * cols]));
            out.push('\n');
        }
        out
    }
}

impl<A: Clone> Position<A> {
    /// The same position with the side to move flipped.
    pub fn with_side_to_move(&self, side_to_move: bool) -> Self {
        Self {
            board: self.board.clone(),
            side_to_move,
            aux: self.aux.clone(),
        }
    }

    /// Mirror image of the placement across `axis`; side to move and `aux` are kept.
    pub fn reflect(&self, geometry: &BoardGeometry, axis: Reflection) -> Self {
        let mut board = vec![EMPTY; self.board.len()];
        for (sq, label) in self.pieces() {
            board[geometry.reflect_sq(sq, axis)] = label;
        }
        Self::new(board, self.side_to_move, self.aux.clone())
    }
}
