use crate::board::BoardGeometry;
use crate::coord::Coord;
use crate::pieces::{belongs_to, PieceLabel};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PieceKind {
    /// Kind of a chess label, either color. Unknown letters are not chess pieces.
    pub fn from_label(label: PieceLabel) -> Option<Self> {
        match label.to_ascii_lowercase() {
            b'k' => Some(PieceKind::King),
            b'q' => Some(PieceKind::Queen),
            b'r' => Some(PieceKind::Rook),
            b'b' => Some(PieceKind::Bishop),
            b'n' => Some(PieceKind::Knight),
            _ => None,
        }
    }
}

/// Square of the given side's king, if it is on the board.
pub fn king_square(board: &[PieceLabel], first_player: bool) -> Option<usize> {
    let king = if first_player { b'K' } else { b'k' };
    board.iter().position(|&l| l == king)
}

/// True iff the given side's king is attacked.
pub fn in_check(geometry: &BoardGeometry, board: &[PieceLabel], first_player: bool) -> bool {
    match king_square(board, first_player) {
        Some(sq) => is_attacked(geometry, board, sq, !first_player),
        None => false,
    }
}

/// True iff `target` is attacked by any piece of the side `by_first_player`.
///
/// Every occupied square blocks sliding pieces.
pub fn is_attacked(
    geometry: &BoardGeometry,
    board: &[PieceLabel],
    target: usize,
    by_first_player: bool,
) -> bool {
    let target_c = geometry.coord_of(target);
    for (sq, &label) in board.iter().enumerate() {
        if sq == target || !belongs_to(label, by_first_player) {
            continue;
        }
        let Some(kind) = PieceKind::from_label(label) else {
            continue;
        };
        if piece_attacks(kind, geometry.coord_of(sq), target_c, geometry, board) {
            return true;
        }
    }
    false
}

fn piece_attacks(
    kind: PieceKind,
    from: Coord,
    target: Coord,
    geometry: &BoardGeometry,
    board: &[PieceLabel],
) -> bool {
    let dx = target.x - from.x;
    let dy = target.y - from.y;

    match kind {
        PieceKind::King => from.king_distance(target) == 1,
        PieceKind::Knight => {
            let ax = dx.abs();
            let ay = dy.abs();
            (ax == 1 && ay == 2) || (ax == 2 && ay == 1)
        }
        PieceKind::Rook => (dx == 0 || dy == 0) && ray_clear(from, target, geometry, board),
        PieceKind::Bishop => dx.abs() == dy.abs() && ray_clear(from, target, geometry, board),
        PieceKind::Queen => {
            (dx == 0 || dy == 0 || dx.abs() == dy.abs())
                && ray_clear(from, target, geometry, board)
        }
    }
}

/// Whether every square strictly between `from` and `target` is empty.
fn ray_clear(from: Coord, target: Coord, geometry: &BoardGeometry, board: &[PieceLabel]) -> bool {
    let step = from.step_towards(target);
    if step.x == 0 && step.y == 0 {
        return false;
    }

    let mut cur = from + step;
    while cur != target {
        match geometry.sq_of(cur) {
            Some(sq) if board[sq] != 0 => return false,
            Some(_) => {}
            None => return false,
        }
        cur += step;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(geometry: &BoardGeometry, pieces: &[(i16, i16, u8)]) -> Vec<PieceLabel> {
        let mut board = vec![0; geometry.size()];
        for &(x, y, l) in pieces {
            board[geometry.sq_of(Coord::new(x, y)).unwrap()] = l;
        }
        board
    }

    #[test]
    fn sliders_are_blocked_by_any_piece() {
        let g = BoardGeometry::standard();
        let board = board_with(&g, &[(0, 0, b'R'), (0, 3, b'k'), (0, 7, b'K')]);
        let a8 = g.sq_of(Coord::new(0, 7)).unwrap();
        let a3 = g.sq_of(Coord::new(0, 2)).unwrap();
        assert!(is_attacked(&g, &board, a3, true));
        assert!(!is_attacked(&g, &board, a8, true));
        assert!(is_attacked(&g, &board, g.sq_of(Coord::new(0, 3)).unwrap(), true));
    }

    #[test]
    fn knight_and_king_patterns() {
        let g = BoardGeometry::standard();
        let board = board_with(&g, &[(1, 0, b'n'), (4, 4, b'K')]);
        assert!(is_attacked(&g, &board, g.sq_of(Coord::new(2, 2)).unwrap(), false));
        assert!(!is_attacked(&g, &board, g.sq_of(Coord::new(1, 1)).unwrap(), false));
        assert!(is_attacked(&g, &board, g.sq_of(Coord::new(5, 5)).unwrap(), true));
        assert!(!is_attacked(&g, &board, g.sq_of(Coord::new(6, 6)).unwrap(), true));
    }

    #[test]
    fn check_detection_uses_the_opponent() {
        let g = BoardGeometry::standard();
        let board = board_with(&g, &[(0, 7, b'k'), (1, 6, b'Q'), (1, 5, b'K')]);
        assert!(in_check(&g, &board, false));
        assert!(!in_check(&g, &board, true));
    }
}
