//! The game state machine.
//!
//! A `Session` owns the board, both reserves, the turn order, and the
//! outcome. It is mutated exclusively through `place` and `try_move`
//! (plus `timeout` from the clock); rejected attempts leave it untouched,
//! so replaying one ordered action stream on two sessions keeps them
//! identical.
//!
//! ## Reserve conservation
//!
//! For each player, pieces on the board plus pieces in reserve always
//! equals the initial reserve size: a capture returns the piece to the
//! *captured* player's reserve, not the capturer's. Capturing yields
//! tempo, never material.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::board::{Board, Square};
use crate::core::piece::{Piece, PieceKind, Reserve};
use crate::core::player::{Player, PlayerMap};
use crate::core::settings::Settings;
use crate::rules::{find_winner, is_board_full, is_legal_move};

/// Terminal or in-progress game result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Win { winner: Player, line: [Square; 4] },
    Draw,
    Timeout { winner: Player },
}

/// What a successful `place` or `try_move` did to the turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnEvent {
    /// The turn passed to the opponent; `mover` just moved.
    Advanced { mover: Player },
    /// The game ended on this action.
    Finished,
}

/// Why a placement was rejected. The session is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceError {
    GameOver,
    Occupied,
    NotInReserve,
}

/// Why a movement was rejected. The session is unchanged.
///
/// `OpeningPhase` is a phase violation, distinct from an illegal move:
/// the adapter may want to explain it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveError {
    GameOver,
    OpeningPhase,
    Illegal,
}

impl std::fmt::Display for PlaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaceError::GameOver => write!(f, "the game is over"),
            PlaceError::Occupied => write!(f, "the cell is occupied"),
            PlaceError::NotInReserve => write!(f, "no such piece in reserve"),
        }
    }
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MoveError::GameOver => write!(f, "the game is over"),
            MoveError::OpeningPhase => write!(f, "opening phase: place pieces before moving"),
            MoveError::Illegal => write!(f, "illegal move"),
        }
    }
}

/// One game in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    board: Board,
    reserves: PlayerMap<Reserve>,
    current_player: Player,
    turn_count: PlayerMap<u32>,
    opening_turns: u32,
    initial_reserve_size: usize,
    outcome: Outcome,
}

impl Session {
    /// A fresh game. White moves first.
    ///
    /// Both peers construct sessions from the same sanitized settings,
    /// which is the whole settings handshake: no board state crosses
    /// the wire.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let reserve = settings.initial_reserve();
        Self {
            board: Board::empty(),
            initial_reserve_size: reserve.len(),
            reserves: PlayerMap::with_value(reserve),
            current_player: Player::White,
            turn_count: PlayerMap::with_value(0),
            opening_turns: settings.opening_turns,
            outcome: Outcome::InProgress,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn reserve(&self, player: Player) -> &Reserve {
        &self.reserves[player]
    }

    #[must_use]
    pub fn reserves(&self) -> &PlayerMap<Reserve> {
        &self.reserves
    }

    #[must_use]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    #[must_use]
    pub fn turn_count(&self, player: Player) -> u32 {
        self.turn_count[player]
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.outcome != Outcome::InProgress
    }

    /// The completed line, once the game is won.
    #[must_use]
    pub fn winning_line(&self) -> Option<[Square; 4]> {
        match self.outcome {
            Outcome::Win { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Pieces each player started with (board + reserve at all times).
    #[must_use]
    pub fn initial_reserve_size(&self) -> usize {
        self.initial_reserve_size
    }

    /// True while only placement is permitted.
    ///
    /// Active while `opening_turns > 0` and either player is still below
    /// that many completed turns.
    #[must_use]
    pub fn in_opening_phase(&self) -> bool {
        self.opening_turns > 0
            && (self.turn_count[Player::White] < self.opening_turns
                || self.turn_count[Player::Black] < self.opening_turns)
    }

    /// Place a reserve piece of the current player on an empty cell.
    ///
    /// Removes the first matching kind from the reserve (multiplicity
    /// matters, identity does not), then runs the shared win/draw check.
    pub fn place(&mut self, square: Square, kind: PieceKind) -> Result<TurnEvent, PlaceError> {
        if self.is_finished() {
            return Err(PlaceError::GameOver);
        }
        if !self.board.is_empty_at(square) {
            return Err(PlaceError::Occupied);
        }
        let mover = self.current_player;
        let Some(slot) = self.reserves[mover].iter().position(|&k| k == kind) else {
            return Err(PlaceError::NotInReserve);
        };

        self.reserves[mover].remove(slot);
        self.board.set(square, Piece::new(mover, kind));
        debug!(player = %mover, %square, ?kind, "placed");
        Ok(self.finish_turn())
    }

    /// Move a board piece of the current player.
    ///
    /// Rejected outright during the opening phase regardless of rule
    /// legality. A capture appends the captured kind to *its owner's*
    /// reserve before the mover's piece lands.
    pub fn try_move(&mut self, from: Square, to: Square) -> Result<TurnEvent, MoveError> {
        if self.is_finished() {
            return Err(MoveError::GameOver);
        }
        if self.in_opening_phase() {
            return Err(MoveError::OpeningPhase);
        }
        let mover = self.current_player;
        if !is_legal_move(&self.board, from, to, mover) {
            return Err(MoveError::Illegal);
        }
        // Legality guarantees `from` holds the mover's piece.
        let Some(piece) = self.board.take(from) else {
            return Err(MoveError::Illegal);
        };
        if let Some(captured) = self.board.take(to) {
            self.reserves[captured.owner].push(captured.kind);
            debug!(owner = %captured.owner, kind = ?captured.kind, "capture returned to reserve");
        }
        self.board.set(to, piece);
        debug!(player = %mover, %from, %to, "moved");
        Ok(self.finish_turn())
    }

    /// End the game because `loser` ran out of time.
    pub fn timeout(&mut self, loser: Player) {
        if self.is_finished() {
            return;
        }
        let winner = loser.opponent();
        self.outcome = Outcome::Timeout { winner };
        debug!(%winner, "win on time");
    }

    /// Shared post-move check: win, then draw, then advance the turn.
    fn finish_turn(&mut self) -> TurnEvent {
        if let Some(win) = find_winner(&self.board) {
            self.outcome = Outcome::Win {
                winner: win.owner,
                line: win.line,
            };
            debug!(winner = %win.owner, "win");
            return TurnEvent::Finished;
        }
        if is_board_full(&self.board) {
            self.outcome = Outcome::Draw;
            debug!("draw");
            return TurnEvent::Finished;
        }

        let mover = self.current_player;
        self.turn_count[mover] += 1;
        self.current_player = mover.opponent();
        TurnEvent::Advanced { mover }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    fn square(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    #[test]
    fn test_place_advances_turn() {
        let mut session = Session::new(&Settings::default());
        assert_eq!(session.current_player(), Player::White);

        let event = session.place(square(0), PieceKind::Pawn).unwrap();
        assert_eq!(event, TurnEvent::Advanced { mover: Player::White });
        assert_eq!(session.current_player(), Player::Black);
        assert_eq!(session.turn_count(Player::White), 1);
        assert_eq!(session.reserve(Player::White).len(), 3);
    }

    #[test]
    fn test_place_rejections_leave_state_unchanged() {
        let mut session = Session::new(&Settings::default());
        session.place(square(0), PieceKind::Pawn).unwrap();

        let before = session.clone();
        assert_eq!(
            session.place(square(0), PieceKind::Rook),
            Err(PlaceError::Occupied)
        );
        assert_eq!(
            session.place(square(1), PieceKind::Queen),
            Err(PlaceError::NotInReserve)
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_place_removes_first_matching_kind() {
        let settings = Settings {
            piece_mode: crate::core::PieceMode::Custom,
            custom_pieces: SmallVec::from_slice(&[
                PieceKind::Pawn,
                PieceKind::Pawn,
                PieceKind::Rook,
                PieceKind::Pawn,
            ]),
            ..Settings::default()
        };
        let mut session = Session::new(&settings);

        session.place(square(0), PieceKind::Pawn).unwrap();
        assert_eq!(
            &session.reserve(Player::White)[..],
            &[PieceKind::Pawn, PieceKind::Rook, PieceKind::Pawn]
        );
    }

    #[test]
    fn test_move_rejected_before_any_placement() {
        let mut session = Session::new(&Settings::default());
        assert_eq!(session.try_move(square(0), square(1)), Err(MoveError::Illegal));
    }

    #[test]
    fn test_opening_phase_gates_movement() {
        let settings = Settings {
            opening_turns: 2,
            ..Settings::default()
        };
        let mut session = Session::new(&settings);
        assert!(session.in_opening_phase());

        session.place(square(0), PieceKind::Rook).unwrap();
        let before = session.clone();

        // Black may not move during the opening, only place.
        assert_eq!(session.try_move(square(0), square(1)), Err(MoveError::OpeningPhase));
        assert_eq!(session, before);
        assert!(session.place(square(4), PieceKind::Pawn).is_ok());
    }

    #[test]
    fn test_opening_phase_ends_after_both_reach_count() {
        let settings = Settings {
            opening_turns: 1,
            ..Settings::default()
        };
        let mut session = Session::new(&settings);

        session.place(square(0), PieceKind::Rook).unwrap();
        assert!(session.in_opening_phase());
        session.place(square(4), PieceKind::Rook).unwrap();
        assert!(!session.in_opening_phase());
    }

    #[test]
    fn test_timeout_sets_winner() {
        let mut session = Session::new(&Settings::default());
        session.timeout(Player::White);
        assert_eq!(session.outcome(), Outcome::Timeout { winner: Player::Black });

        // Finished state is sticky.
        session.timeout(Player::Black);
        assert_eq!(session.outcome(), Outcome::Timeout { winner: Player::Black });
        assert_eq!(session.place(square(0), PieceKind::Pawn), Err(PlaceError::GameOver));
    }
}
