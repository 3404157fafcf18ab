//! Pure rule functions over the board.

pub mod engine;

pub use engine::{find_winner, is_board_full, is_legal_move, WinLine};
