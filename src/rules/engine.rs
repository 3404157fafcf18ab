//! Pure legality: movement, fullness, win detection.
//!
//! Nothing here mutates state or knows about turns; the session layer
//! decides what a rejection means.

use crate::core::board::{Board, Square, WIN_LINES};
use crate::core::piece::PieceKind;
use crate::core::player::Player;

/// A completed win line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WinLine {
    pub owner: Player,
    pub line: [Square; 4],
}

/// Movement legality for one piece.
///
/// Rejects `from == to`, an empty or foreign `from`, and a destination
/// holding the mover's own piece. Per-kind rules:
///
/// - Pawn: one orthogonal step onto an *empty* cell, or one diagonal step
///   onto an *opponent* cell. No forward-direction restriction.
/// - King: any distance-1 step.
/// - Rook / Bishop / Queen: straight / diagonal / either, with every cell
///   strictly between `from` and `to` empty.
/// - Knight: (2,1) or (1,2), never path-blocked.
#[must_use]
pub fn is_legal_move(board: &Board, from: Square, to: Square, mover: Player) -> bool {
    if from == to {
        return false;
    }
    let Some(piece) = board.get(from) else {
        return false;
    };
    if piece.owner != mover {
        return false;
    }
    let target = board.get(to);
    if target.is_some_and(|t| t.owner == mover) {
        return false;
    }

    let dc = to.col() as i8 - from.col() as i8;
    let dr = to.row() as i8 - from.row() as i8;
    let (adc, adr) = (dc.abs(), dr.abs());

    match piece.kind {
        PieceKind::Pawn => {
            if adc + adr == 1 {
                // Orthogonal step: move only, never capture.
                target.is_none()
            } else if adc == 1 && adr == 1 {
                // Diagonal step: capture only. Own pieces were filtered above.
                target.is_some()
            } else {
                false
            }
        }
        PieceKind::King => adc <= 1 && adr <= 1,
        PieceKind::Rook => (dc == 0 || dr == 0) && path_clear(board, from, to, dc, dr),
        PieceKind::Bishop => adc == adr && path_clear(board, from, to, dc, dr),
        PieceKind::Queen => (dc == 0 || dr == 0 || adc == adr) && path_clear(board, from, to, dc, dr),
        PieceKind::Knight => (adc == 2 && adr == 1) || (adc == 1 && adr == 2),
    }
}

/// True iff every cell strictly between `from` and `to` is empty.
///
/// Only called for straight or diagonal deltas.
fn path_clear(board: &Board, from: Square, to: Square, dc: i8, dr: i8) -> bool {
    let (step_c, step_r) = (dc.signum(), dr.signum());
    let mut col = from.col() as i8 + step_c;
    let mut row = from.row() as i8 + step_r;

    while (col, row) != (to.col() as i8, to.row() as i8) {
        if !board.is_empty_at(Square::at(col as u8, row as u8)) {
            return false;
        }
        col += step_c;
        row += step_r;
    }
    true
}

/// True iff no cell is empty.
#[must_use]
pub fn is_board_full(board: &Board) -> bool {
    Square::all().all(|s| !board.is_empty_at(s))
}

/// The first win line, in fixed scan order, whose four cells are occupied
/// by one owner. Piece kind is irrelevant.
#[must_use]
pub fn find_winner(board: &Board) -> Option<WinLine> {
    for line in WIN_LINES {
        let mut owners = line.iter().map(|&s| board.get(s).map(|p| p.owner));
        let Some(Some(first)) = owners.next() else {
            continue;
        };
        if owners.all(|owner| owner == Some(first)) {
            return Some(WinLine { owner: first, line });
        }
    }
    None
}
