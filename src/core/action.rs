//! The action stream.
//!
//! An `Action` is the sole unit by which session and clock state advance,
//! whether it originated locally or arrived as a relay broadcast. The set
//! is closed: the apply function matches exhaustively, so there is no
//! "unrecognized action" fallthrough.

use serde::{Deserialize, Serialize};

use super::board::Square;
use super::piece::PieceKind;
use super::settings::Settings;

/// A tagged unit of intent, gameplay or administrative.
///
/// Variant names mirror the wire protocol's action tags
/// (`place`, `move`, `clock-start`, `restart`, `sync-settings`,
/// `start-game`, `swap-sides`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Put a reserve piece of the mover's on an empty cell.
    Place { index: Square, piece: PieceKind },
    /// Move a board piece, capturing any opponent piece on `to`.
    Move { from: Square, to: Square },
    /// Start both peers' clocks at the same point in the stream.
    ClockStart,
    /// Reset to a fresh game with the current settings.
    Restart,
    /// Host-announced settings for the next game.
    SyncSettings { settings: Settings },
    /// Reset to a fresh game; follows `SyncSettings` in the handshake.
    StartGame,
    /// Both peers flip their local role mapping.
    SwapSides,
}

impl Action {
    /// Encode for the wire.
    pub fn encode(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode a wire frame.
    pub fn decode(bytes: &[u8]) -> Result<Action, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    #[test]
    fn test_json_tags_match_wire_protocol() {
        let place = Action::Place {
            index: square(3),
            piece: PieceKind::Rook,
        };
        assert_eq!(
            serde_json::to_string(&place).unwrap(),
            r#"{"place":{"index":3,"piece":"rook"}}"#
        );

        assert_eq!(
            serde_json::to_string(&Action::ClockStart).unwrap(),
            r#""clock-start""#
        );
        assert_eq!(
            serde_json::to_string(&Action::SwapSides).unwrap(),
            r#""swap-sides""#
        );
    }

    #[test]
    fn test_json_roundtrip() {
        let actions = vec![
            Action::Place { index: square(0), piece: PieceKind::Queen },
            Action::Move { from: square(0), to: square(15) },
            Action::ClockStart,
            Action::Restart,
            Action::SyncSettings { settings: Settings::default() },
            Action::StartGame,
            Action::SwapSides,
        ];

        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            let back: Action = serde_json::from_str(&json).unwrap();
            assert_eq!(action, back);
        }
    }

    #[test]
    fn test_wire_frame_roundtrip() {
        let action = Action::Move { from: square(4), to: square(7) };
        let frame = action.encode().unwrap();
        assert_eq!(Action::decode(&frame).unwrap(), action);
    }

    #[test]
    fn test_decode_rejects_bad_square() {
        let err = serde_json::from_str::<Action>(r#"{"move":{"from":0,"to":16}}"#);
        assert!(err.is_err());
    }
}
