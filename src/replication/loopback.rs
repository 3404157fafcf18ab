//! An in-memory relay for tests and local development.
//!
//! `LoopbackRelay` is the hub: it owns rooms and per-participant
//! mailboxes. Each participant holds a [`LoopbackLink`] endpoint; a test
//! drains mailboxes and feeds events to drivers, which models the
//! one-at-a-time, arrival-order delivery the real relay guarantees.
//! Broadcast actions are queued to every room member, the sender
//! included, crossing the hub as bincode wire frames.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::action::Action;
use crate::core::player::Player;

use super::relay::{
    ClientCommand, ParticipantId, RelayError, RelayEvent, RelayLink, RoleMap, RoomCode,
};

#[derive(Default)]
struct Shared {
    next_room: u32,
    rooms: FxHashMap<RoomCode, RoomState>,
    mailboxes: FxHashMap<ParticipantId, VecDeque<RelayEvent>>,
    disconnected: Vec<ParticipantId>,
}

struct RoomState {
    members: Vec<(ParticipantId, Player)>,
}

impl Shared {
    fn push(&mut self, id: &ParticipantId, event: RelayEvent) {
        self.mailboxes.entry(id.clone()).or_default().push_back(event);
    }
}

/// The hub side of the loopback relay.
#[derive(Default)]
pub struct LoopbackRelay {
    shared: Rc<RefCell<Shared>>,
}

impl LoopbackRelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A link endpoint for one participant.
    #[must_use]
    pub fn endpoint(&self, id: &str) -> LoopbackLink {
        let id = ParticipantId::new(id);
        self.shared.borrow_mut().mailboxes.entry(id.clone()).or_default();
        LoopbackLink {
            shared: Rc::clone(&self.shared),
            id,
        }
    }

    /// Take every queued event for a participant, in arrival order.
    #[must_use]
    pub fn drain(&self, id: &str) -> Vec<RelayEvent> {
        let id = ParticipantId::new(id);
        let mut shared = self.shared.borrow_mut();
        shared
            .mailboxes
            .get_mut(&id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Drop a participant: room peers see `OpponentLeft` and the room
    /// stops being ready. Session state on the peers is untouched.
    pub fn disconnect(&self, id: &str) {
        let id = ParticipantId::new(id);
        let mut shared = self.shared.borrow_mut();

        let mut peers = Vec::new();
        for room in shared.rooms.values_mut() {
            if room.members.iter().any(|(member, _)| *member == id) {
                room.members.retain(|(member, _)| *member != id);
                peers.extend(room.members.iter().map(|(member, _)| member.clone()));
            }
        }
        for peer in peers {
            shared.push(&peer, RelayEvent::OpponentLeft);
        }
        shared.disconnected.push(id);
    }
}

/// One participant's sending endpoint.
pub struct LoopbackLink {
    shared: Rc<RefCell<Shared>>,
    id: ParticipantId,
}

impl RelayLink for LoopbackLink {
    fn send(&mut self, command: ClientCommand) -> Result<(), RelayError> {
        let mut shared = self.shared.borrow_mut();
        if shared.disconnected.contains(&self.id) {
            return Err(RelayError::Disconnected);
        }

        match command {
            ClientCommand::CreateRoom => {
                shared.next_room += 1;
                let code = RoomCode::new(format!("Q{:03}", shared.next_room));
                shared.rooms.insert(
                    code.clone(),
                    RoomState {
                        members: vec![(self.id.clone(), Player::White)],
                    },
                );
                let event = RelayEvent::RoomCreated {
                    code,
                    role: Player::White,
                    self_id: self.id.clone(),
                };
                let id = self.id.clone();
                shared.push(&id, event);
            }
            ClientCommand::JoinRoom { code } => {
                let seat = match shared.rooms.get_mut(&code) {
                    None => Err("Room not found"),
                    Some(room) if room.members.len() >= 2 => Err("Room is full"),
                    Some(room) => {
                        room.members.push((self.id.clone(), Player::Black));
                        Ok(room.members.iter().map(|(m, _)| m.clone()).collect::<Vec<_>>())
                    }
                };
                match seat {
                    Err(message) => {
                        let id = self.id.clone();
                        shared.push(
                            &id,
                            RelayEvent::RoomError {
                                message: message.to_string(),
                            },
                        );
                    }
                    Ok(members) => {
                        let id = self.id.clone();
                        shared.push(
                            &id,
                            RelayEvent::RoomJoined {
                                code: code.clone(),
                                role: Player::Black,
                                self_id: id.clone(),
                            },
                        );
                        for member in &members {
                            shared.push(member, RelayEvent::RoomReady { code: code.clone() });
                        }
                    }
                }
            }
            ClientCommand::Action { room, action } => {
                let mut members = Vec::new();
                let mut roles: Option<RoleMap> = None;
                if let Some(state) = shared.rooms.get_mut(&room) {
                    // Swaps update the relay's own role bookkeeping so a
                    // later roles-updated matches what peers applied.
                    if action == Action::SwapSides {
                        for member in &mut state.members {
                            member.1 = member.1.opponent();
                        }
                        roles = Some(state.members.iter().cloned().collect());
                    }
                    members = state.members.iter().map(|(m, _)| m.clone()).collect();
                } else {
                    let id = self.id.clone();
                    shared.push(
                        &id,
                        RelayEvent::RoomError {
                            message: format!("No such room: {room}"),
                        },
                    );
                    return Ok(());
                }

                // The hub carries the action as an opaque wire frame;
                // each delivery decodes its own copy.
                let frame = action
                    .encode()
                    .map_err(|e| RelayError::Codec(e.to_string()))?;
                for member in &members {
                    let action =
                        Action::decode(&frame).map_err(|e| RelayError::Codec(e.to_string()))?;
                    shared.push(member, RelayEvent::Action { action });
                }
                if let Some(roles) = roles {
                    for member in &members {
                        shared.push(
                            member,
                            RelayEvent::RolesUpdated {
                                code: room.clone(),
                                roles: roles.clone(),
                            },
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
