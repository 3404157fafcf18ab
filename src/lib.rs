//! # quartz
//!
//! A two-player abstract strategy game on a 4x4 grid: chess-like pieces
//! are placed from a personal reserve and then maneuvered, and the first
//! player whose pieces occupy all four cells of any row, column, or main
//! diagonal wins - regardless of piece kind.
//!
//! ## Design Principles
//!
//! 1. **One action stream**: Session and clock state advance only by
//!    applying [`core::Action`]s. The apply function is identical for
//!    locally-originated and relay-delivered actions, so the offline and
//!    online paths cannot diverge.
//!
//! 2. **Deterministic replay**: Two participants fed the same settings
//!    and the same ordered action sequence reach bit-identical sessions.
//!    Consistency across processes comes entirely from replay, never from
//!    shared state.
//!
//! 3. **Owned resources**: The clock's periodic timer is represented by a
//!    generation-stamped token; stopping or retargeting invalidates every
//!    outstanding token, so duplicate concurrent timers cannot decrement
//!    anyone.
//!
//! ## Modules
//!
//! - `core`: players, pieces, the board, actions, settings
//! - `rules`: pure movement legality and win/draw detection
//! - `session`: the game state machine
//! - `clock`: per-player countdown with increment and lazy start
//! - `replication`: relay interface and the per-participant driver

pub mod clock;
pub mod core;
pub mod replication;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Action, Board, Piece, PieceKind, PieceMode, Player, PlayerMap, Reserve, Settings, Square,
    WIN_LINES,
};

pub use crate::rules::{find_winner, is_board_full, is_legal_move, WinLine};

pub use crate::session::{MoveError, Outcome, PlaceError, Session, TurnEvent};

pub use crate::clock::{Clock, TickOutcome, TickToken};

pub use crate::replication::{
    ClientCommand, GameDriver, LoopbackLink, LoopbackRelay, NullRelay, ParticipantId, RelayError,
    RelayEvent, RelayLink, RoleMap, Room, RoomCode, Snapshot,
};
