//! The 4x4 board: squares, cells, and win lines.
//!
//! Cells are indexed 0-15 row-major with 4 columns, so column is
//! `index % 4` and row is `index / 4`. The board always holds exactly
//! 16 cells.

use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::player::Player;

/// A validated board index in 0..16.
///
/// Serialized as a bare number; out-of-range values fail deserialization
/// rather than producing an unusable square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Square(u8);

impl Square {
    /// Number of cells on the board.
    pub const COUNT: usize = 16;

    /// Board width and height.
    pub const SIDE: u8 = 4;

    /// Create a square from a raw index, if in range.
    #[must_use]
    pub fn new(index: u8) -> Option<Square> {
        (index < Self::COUNT as u8).then_some(Square(index))
    }

    /// Create a square from column and row.
    ///
    /// Callers must pass coordinates in 0..4.
    #[must_use]
    pub const fn at(col: u8, row: u8) -> Square {
        Square(row * Self::SIDE + col)
    }

    /// Raw index in 0..16.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Column in 0..4.
    #[must_use]
    pub const fn col(self) -> u8 {
        self.0 % Self::SIDE
    }

    /// Row in 0..4.
    #[must_use]
    pub const fn row(self) -> u8 {
        self.0 / Self::SIDE
    }

    /// Iterate over all 16 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::COUNT as u8).map(Square)
    }
}

impl TryFrom<u8> for Square {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Square::new(value).ok_or_else(|| format!("square index {value} out of range"))
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> u8 {
        square.0
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const fn sq(index: u8) -> Square {
    Square(index)
}

/// The 10 win lines: 4 rows, 4 columns, 2 main diagonals, in scan order.
///
/// A game ends as soon as one player's pieces (of any kinds) occupy all
/// four cells of a line. `find_winner` reports the first line in this
/// order, making simultaneous completions deterministic.
pub const WIN_LINES: [[Square; 4]; 10] = [
    [sq(0), sq(1), sq(2), sq(3)],
    [sq(4), sq(5), sq(6), sq(7)],
    [sq(8), sq(9), sq(10), sq(11)],
    [sq(12), sq(13), sq(14), sq(15)],
    [sq(0), sq(4), sq(8), sq(12)],
    [sq(1), sq(5), sq(9), sq(13)],
    [sq(2), sq(6), sq(10), sq(14)],
    [sq(3), sq(7), sq(11), sq(15)],
    [sq(0), sq(5), sq(10), sq(15)],
    [sq(3), sq(6), sq(9), sq(12)],
];

/// The 16-cell grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Option<Piece>; 16],
}

impl Board {
    /// Create an empty board.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The piece on a square, if any.
    #[must_use]
    pub fn get(&self, square: Square) -> Option<Piece> {
        self.cells[square.index()]
    }

    /// Occupy a square.
    pub fn set(&mut self, square: Square, piece: Piece) {
        self.cells[square.index()] = Some(piece);
    }

    /// Vacate a square, returning its former occupant.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.cells[square.index()].take()
    }

    /// True if the square holds no piece.
    #[must_use]
    pub fn is_empty_at(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    /// Number of pieces a player has on the board.
    #[must_use]
    pub fn piece_count(&self, player: Player) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|p| p.owner == player)
            .count()
    }

    /// Iterate over occupied squares and their pieces.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|s| self.get(s).map(|p| (s, p)))
    }
}
