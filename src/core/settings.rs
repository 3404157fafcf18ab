//! Session settings.
//!
//! Settings are read once when a game starts (locally, or received in a
//! `sync-settings` action from the host) and stay immutable for the whole
//! session. Malformed values are clamped or defaulted, never rejected:
//! a session must always be startable.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::piece::{PieceKind, Reserve};

/// How each player's starting reserve is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceMode {
    /// The default pawn/rook/bishop/knight set.
    #[default]
    Classic,
    /// Four kinds picked in the menu (duplicates allowed).
    Custom,
}

/// Options chosen before a game starts.
///
/// Every field has a default so a partial wire payload still yields a
/// startable session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub piece_mode: PieceMode,
    /// Exactly 4 kinds; any other length falls back to the classic set.
    pub custom_pieces: SmallVec<[PieceKind; 4]>,
    pub clock_on: bool,
    /// Starting time per player, seconds. Minimum 10.
    pub clock_seconds: u32,
    /// Seconds credited to the mover on every turn advance.
    pub clock_increment: u32,
    /// Placement-only turns per player at the start, 0..=4.
    pub opening_turns: u32,
    /// Presentation hint: render the board rotated for Black.
    pub flip_black: bool,
}

impl Settings {
    /// The classic starting reserve.
    pub const DEFAULT_RESERVE: [PieceKind; 4] = [
        PieceKind::Pawn,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    /// Maximum opening turns per player.
    pub const MAX_OPENING_TURNS: u32 = 4;

    /// Minimum starting clock time, seconds.
    pub const MIN_CLOCK_SECONDS: u32 = 10;

    /// Clamp out-of-range fields and fall back on a bad custom piece list.
    #[must_use]
    pub fn sanitize(mut self) -> Self {
        self.clock_seconds = self.clock_seconds.max(Self::MIN_CLOCK_SECONDS);
        self.opening_turns = self.opening_turns.min(Self::MAX_OPENING_TURNS);
        if self.custom_pieces.len() != 4 {
            self.custom_pieces = SmallVec::from_slice(&Self::DEFAULT_RESERVE);
        }
        self
    }

    /// The starting reserve each player receives.
    #[must_use]
    pub fn initial_reserve(&self) -> Reserve {
        match self.piece_mode {
            PieceMode::Classic => SmallVec::from_slice(&Self::DEFAULT_RESERVE),
            PieceMode::Custom if self.custom_pieces.len() == 4 => self.custom_pieces.clone(),
            PieceMode::Custom => SmallVec::from_slice(&Self::DEFAULT_RESERVE),
        }
    }

    /// Pieces each player starts the game with, in total.
    #[must_use]
    pub fn initial_reserve_size(&self) -> usize {
        self.initial_reserve().len()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            piece_mode: PieceMode::Classic,
            custom_pieces: SmallVec::from_slice(&Self::DEFAULT_RESERVE),
            clock_on: false,
            clock_seconds: 180,
            clock_increment: 0,
            opening_turns: 0,
            flip_black: false,
        }
    }
}
