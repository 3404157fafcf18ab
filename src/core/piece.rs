//! Piece kinds and placed pieces.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::player::Player;

/// A chess piece kind.
///
/// Kinds only constrain *movement*. Win detection is ownership-only, so a
/// pawn on a win line counts the same as a queen. The king carries no
/// special protection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Rook,
    Bishop,
    Knight,
    Queen,
    King,
}

impl PieceKind {
    /// Every kind, in menu order.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Queen,
        PieceKind::King,
    ];
}

/// A piece occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Player,
    pub kind: PieceKind,
}

impl Piece {
    #[must_use]
    pub const fn new(owner: Player, kind: PieceKind) -> Self {
        Self { owner, kind }
    }
}

/// A player's pool of not-yet-placed pieces.
///
/// Order is irrelevant to gameplay; removal takes the first matching kind.
/// Captures append the captured kind here - to the *captured* player's
/// reserve, never the capturer's.
pub type Reserve = SmallVec<[PieceKind; 4]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&PieceKind::Knight).unwrap(), "\"knight\"");
        let back: PieceKind = serde_json::from_str("\"queen\"").unwrap();
        assert_eq!(back, PieceKind::Queen);
    }

    #[test]
    fn test_piece_roundtrip() {
        let piece = Piece::new(Player::Black, PieceKind::Rook);
        let json = serde_json::to_string(&piece).unwrap();
        let back: Piece = serde_json::from_str(&json).unwrap();
        assert_eq!(piece, back);
    }
}
