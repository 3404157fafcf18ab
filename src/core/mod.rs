//! Core leaf types: players, pieces, the board, actions, settings.
//!
//! Everything here is pure data with no dependencies on the session or
//! replication layers.

pub mod action;
pub mod board;
pub mod piece;
pub mod player;
pub mod settings;

pub use action::Action;
pub use board::{Board, Square, WIN_LINES};
pub use piece::{Piece, PieceKind, Reserve};
pub use player::{Player, PlayerMap};
pub use settings::{PieceMode, Settings};
