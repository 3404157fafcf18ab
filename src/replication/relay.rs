//! The relay interface.
//!
//! The relay is an external, room-scoped, order-preserving broadcast
//! service: it assigns roles, echoes every submitted action back to all
//! room members (sender included), and its arrival order is the one
//! authoritative ordering. This module specifies the wire types and the
//! transport seam; it implements no transport.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::action::Action;
use crate::core::player::Player;

/// A room's join code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomCode(String);

impl RoomCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relay-assigned identifier for one connected participant.
///
/// Opaque to the core; role maps are keyed by it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role assignments for every participant in a room.
pub type RoleMap = FxHashMap<ParticipantId, Player>;

/// Client-to-relay messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientCommand {
    CreateRoom,
    JoinRoom { code: RoomCode },
    Action { room: RoomCode, action: Action },
}

/// Relay-to-client messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelayEvent {
    RoomCreated {
        code: RoomCode,
        role: Player,
        self_id: ParticipantId,
    },
    RoomJoined {
        code: RoomCode,
        role: Player,
        self_id: ParticipantId,
    },
    /// Both seats are filled; the game can be configured and started.
    RoomReady { code: RoomCode },
    /// Authoritative role assignments, e.g. after a side swap.
    RolesUpdated { code: RoomCode, roles: RoleMap },
    /// The other participant disconnected. In-progress state is kept.
    OpponentLeft,
    /// Non-fatal; reported as status text only.
    RoomError { message: String },
    /// An action broadcast in relay order, the sender's own included.
    Action { action: Action },
}

/// Why a send failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayError {
    Disconnected,
    /// An action frame failed to encode or decode.
    Codec(String),
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayError::Disconnected => write!(f, "relay link disconnected"),
            RelayError::Codec(message) => write!(f, "action frame codec error: {message}"),
        }
    }
}

impl std::error::Error for RelayError {}

/// The transport seam.
///
/// Implementations carry `ClientCommand`s to the relay; delivery of
/// `RelayEvent`s back to the driver is the hosting event loop's job,
/// one at a time, in arrival order.
pub trait RelayLink {
    fn send(&mut self, command: ClientCommand) -> Result<(), RelayError>;
}

/// A link that goes nowhere, for purely local games.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRelay;

impl RelayLink for NullRelay {
    fn send(&mut self, _command: ClientCommand) -> Result<(), RelayError> {
        Ok(())
    }
}

/// Driver-side view of room membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub code: RoomCode,
    /// Which side this participant plays. Swappable via `swap-sides`.
    pub role: Player,
    /// Both seats filled and neither has left.
    pub ready: bool,
    /// Our own relay-assigned id, for resolving role maps.
    pub self_id: ParticipantId,
}
