//! Pawnless orthodox chess on a rectangular board.
//!
//! Kings, queens, rooks, bishops and knights move as in chess. There is no castling and
//! no promotion, so positions carry no auxiliary data. Captures are generated forward
//! (they leave the configuration and are never classified), but reverse moves never
//! un-capture: the retrograde graph of a configuration is closed under unmoves.

use crate::board::{BoardGeometry, Reflection};
use crate::coord::{Coord, BISHOP_DIRS, KING_STEPS, KNIGHT_JUMPS, QUEEN_DIRS, ROOK_DIRS};
use crate::pieces::{belongs_to, is_empty, PieceLabel, EMPTY};
use crate::position::{NoAux, Position};
use crate::rules::attacks::{in_check, king_square, PieceKind};
use crate::rules::Rules;

#[derive(Clone, Debug)]
pub struct ChessRules {
    geometry: BoardGeometry,
}

impl ChessRules {
    pub fn new(geometry: BoardGeometry) -> Self {
        Self { geometry }
    }

    pub fn standard() -> Self {
        Self::new(BoardGeometry::standard())
    }

    /// Squares `kind` can reach from `from`, walking only through empty squares.
    ///
    /// With `captures`, a square holding an enemy non-king piece ends a ray and is
    /// included. Without, only empty squares are returned; since these pieces move
    /// symmetrically this is also the set of squares they could have come from.
    fn destinations(
        &self,
        kind: PieceKind,
        from: usize,
        board: &[PieceLabel],
        mover: bool,
        captures: bool,
    ) -> Vec<usize> {
        let g = &self.geometry;
        let origin = g.coord_of(from);
        let enterable = |sq: usize| -> bool {
            let l = board[sq];
            is_empty(l)
                || (captures
                    && belongs_to(l, !mover)
                    && PieceKind::from_label(l) != Some(PieceKind::King))
        };

        let mut out = Vec::new();
        match kind {
            PieceKind::King | PieceKind::Knight => {
                let deltas: &[Coord] = if kind == PieceKind::King {
                    &KING_STEPS
                } else {
                    &KNIGHT_JUMPS
                };
                for &d in deltas {
                    if let Some(sq) = g.sq_of(origin + d) {
                        if enterable(sq) {
                            out.push(sq);
                        }
                    }
                }
            }
            PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop => {
                let dirs: &[Coord] = match kind {
                    PieceKind::Queen => &QUEEN_DIRS,
                    PieceKind::Rook => &ROOK_DIRS,
                    _ => &BISHOP_DIRS,
                };
                for &dir in dirs {
                    let mut cur = origin + dir;
                    while let Some(sq) = g.sq_of(cur) {
                        if is_empty(board[sq]) {
                            out.push(sq);
                            cur += dir;
                            continue;
                        }
                        if enterable(sq) {
                            out.push(sq);
                        }
                        break;
                    }
                }
            }
        }
        out
    }
}

impl Rules for ChessRules {
    type Aux = NoAux;

    fn board(&self) -> &BoardGeometry {
        &self.geometry
    }

    fn forward_moves(&self, pos: &Position) -> Vec<Position> {
        let mover = pos.side_to_move;
        let board = pos.board();
        let mut out = Vec::new();

        for (from, label) in pos.pieces() {
            if !belongs_to(label, mover) {
                continue;
            }
            let Some(kind) = PieceKind::from_label(label) else {
                continue;
            };
            for to in self.destinations(kind, from, board, mover, true) {
                let mut next = board.to_vec();
                next[to] = label;
                next[from] = EMPTY;
                if in_check(&self.geometry, &next, mover) {
                    continue;
                }
                out.push(Position::new(next, !mover, ()));
            }
        }
        out
    }

    fn reverse_moves(&self, pos: &Position) -> Vec<Position> {
        // The side that just moved is the one not on move now.
        let mover = !pos.side_to_move;
        let board = pos.board();
        let mut out = Vec::new();

        for (to, label) in pos.pieces() {
            if !belongs_to(label, mover) {
                continue;
            }
            let Some(kind) = PieceKind::from_label(label) else {
                continue;
            };
            for from in self.destinations(kind, to, board, mover, false) {
                let mut prev = board.to_vec();
                prev[from] = label;
                prev[to] = EMPTY;
                let pred = Position::new(prev, mover, ());
                if self.is_valid(&pred) {
                    out.push(pred);
                }
            }
        }
        out
    }

    fn is_terminal(&self, pos: &Position) -> bool {
        in_check(&self.geometry, pos.board(), pos.side_to_move)
            && self.forward_moves(pos).is_empty()
    }

    /// Kings are never adjacent and the side that just moved is never left in check.
    fn is_valid(&self, pos: &Position) -> bool {
        let board = pos.board();
        if let (Some(a), Some(b)) = (king_square(board, true), king_square(board, false)) {
            if self.geometry.coord_of(a).king_distance(self.geometry.coord_of(b)) <= 1 {
                return false;
            }
        }
        !in_check(&self.geometry, board, !pos.side_to_move)
    }

    fn is_royal(&self, label: PieceLabel) -> bool {
        PieceKind::from_label(label) == Some(PieceKind::King)
    }

    /// Without pawns every piece moves the same way in a mirror.
    fn is_symmetric(&self, pieces: &[PieceLabel], _axis: Reflection) -> bool {
        pieces.iter().all(|&l| PieceKind::from_label(l).is_some())
    }

    /// Capturing the only non-royal piece leaves bare kings, a dead draw.
    fn leaves_piece_set(&self, pieces: &[PieceLabel]) -> bool {
        pieces.iter().filter(|&&l| !self.is_royal(l)).count() > 1
    }
}
