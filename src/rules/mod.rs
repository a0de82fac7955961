//! The rules descriptor consumed by the solver.
//!
//! The core never knows how pieces move. A game plugs in through [`Rules`], which bundles
//! the forward move generator, the reverse (unmove) generator, the terminal evaluator, the
//! optional validity filter and a little piece-type metadata.
//!
//! [`chess`] is a reference implementation for pawnless orthodox chess on any rectangular
//! board; it is what the tests and the runner binary solve.

use std::fmt::Debug;
use std::hash::Hash;

use crate::board::{BoardGeometry, Reflection};
use crate::pieces::PieceLabel;
use crate::position::Position;

pub mod attacks;
pub mod chess;

/// Game rules as seen by the retrograde solver.
///
/// Implementations must keep the two move generators consistent:
/// `q ∈ forward_moves(p)` iff `p ∈ reverse_moves(q)` for every position of the
/// configuration being solved.
pub trait Rules: Sync {
    /// Opaque per-position payload (e.g. en-passant rights). Never inspected by the core.
    type Aux: Clone + Eq + Hash + Debug + Default + Send + Sync;

    fn board(&self) -> &BoardGeometry;

    /// Legal successors for the side to move. Empty means no legal move.
    fn forward_moves(&self, pos: &Position<Self::Aux>) -> Vec<Position<Self::Aux>>;

    /// Legal predecessors: positions from which one legal move reaches `pos`.
    fn reverse_moves(&self, pos: &Position<Self::Aux>) -> Vec<Position<Self::Aux>>;

    /// True iff the side to move has no legal move and has lost.
    fn is_terminal(&self, pos: &Position<Self::Aux>) -> bool;

    /// Rejects placements that cannot occur in the game. The default accepts everything.
    fn is_valid(&self, _pos: &Position<Self::Aux>) -> bool {
        true
    }

    /// Royal pieces are the ones every configuration must contain.
    fn is_royal(&self, label: PieceLabel) -> bool;

    /// Whether a piece set (and therefore every rule applied to it) is invariant under
    /// `axis`. Only consulted by the enumerator's symmetry reduction.
    fn is_symmetric(&self, _pieces: &[PieceLabel], _axis: Reflection) -> bool {
        false
    }

    /// Whether a forward move from a position holding `pieces` can reach a decided position
    /// of another piece set. Such successors are outside the table being solved, so
    /// positions won or lost only through them come out undetermined.
    fn leaves_piece_set(&self, _pieces: &[PieceLabel]) -> bool {
        false
    }
}
