//! The replication driver.
//!
//! `GameDriver` owns one participant's session, clock, and room state,
//! and advances them exclusively through [`Action`]s. Applying an action
//! is the same deterministic transition whether the action originated
//! locally (offline) or arrived as a relay broadcast (online); the only
//! thing the transport decides is *when* an action is applied. Offline,
//! an originated action applies immediately. Online, it is sent to the
//! relay and applied on the echoed broadcast, so both peers observe one
//! linear, relay-ordered action history.

use im::Vector;
use tracing::{debug, warn};

use crate::clock::{Clock, TickOutcome, TickToken};
use crate::core::action::Action;
use crate::core::board::Square;
use crate::core::piece::{PieceKind, Reserve};
use crate::core::player::{Player, PlayerMap};
use crate::core::settings::Settings;
use crate::rules::is_legal_move;
use crate::session::{MoveError, Outcome, Session, TurnEvent};

use super::relay::{ClientCommand, NullRelay, RelayError, RelayEvent, RelayLink, Room, RoomCode};

/// Read-only state for the presentation adapter, produced after every
/// change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: crate::core::Board,
    pub reserves: PlayerMap<Reserve>,
    pub current_player: Player,
    pub outcome: Outcome,
    pub winning_line: Option<[Square; 4]>,
    /// `mm:ss` per player while the clock is enabled.
    pub clock: Option<PlayerMap<String>>,
    pub selected_cell: Option<Square>,
    pub selected_reserve: Option<PieceKind>,
    pub status: String,
}

/// One participant's session, clock, room, and action stream.
pub struct GameDriver<L: RelayLink> {
    link: L,
    settings: Settings,
    session: Session,
    clock: Clock,
    room: Option<Room>,
    selected_cell: Option<Square>,
    selected_reserve: Option<PieceKind>,
    status: String,
    history: Vector<Action>,
}

impl GameDriver<NullRelay> {
    /// A purely local two-player driver.
    #[must_use]
    pub fn offline(settings: Settings) -> Self {
        Self::new(NullRelay, settings)
    }
}

impl<L: RelayLink> GameDriver<L> {
    /// A driver over the given relay link. Offline until a room event
    /// arrives.
    #[must_use]
    pub fn new(link: L, settings: Settings) -> Self {
        let settings = settings.sanitize();
        let session = Session::new(&settings);
        let clock = Clock::new(&settings);
        let mut driver = Self {
            link,
            settings,
            session,
            clock,
            room: None,
            selected_cell: None,
            selected_reserve: None,
            status: String::new(),
            history: Vector::new(),
        };
        driver.update_status();
        driver
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Every action applied so far, in order.
    #[must_use]
    pub fn history(&self) -> &Vector<Action> {
        &self.history
    }

    /// Current presentation state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.session.board().clone(),
            reserves: self.session.reserves().clone(),
            current_player: self.session.current_player(),
            outcome: self.session.outcome(),
            winning_line: self.session.winning_line(),
            clock: self.clock.enabled().then(|| {
                PlayerMap::new(|p| self.clock.format_remaining(p))
            }),
            selected_cell: self.selected_cell,
            selected_reserve: self.selected_reserve,
            status: self.status.clone(),
        }
    }

    // === Room management ===

    pub fn create_room(&mut self) -> Result<(), RelayError> {
        self.link.send(ClientCommand::CreateRoom)
    }

    pub fn join_room(&mut self, code: RoomCode) -> Result<(), RelayError> {
        self.link.send(ClientCommand::JoinRoom { code })
    }

    /// Whether this participant may originate a gameplay action now.
    ///
    /// Offline both seats are local, so it is always our turn. Online this
    /// is a UX guard only; correctness comes from replaying the ordered
    /// stream, not from gating.
    #[must_use]
    pub fn my_turn(&self) -> bool {
        match &self.room {
            None => true,
            Some(room) => room.role == self.session.current_player(),
        }
    }

    // === Adapter intents ===

    /// A reserve piece was tapped. Toggles the pending selection.
    pub fn reserve_tapped(&mut self, player: Player, kind: PieceKind) {
        if self.session.is_finished() || !self.my_turn() {
            return;
        }
        if player != self.session.current_player() {
            return;
        }
        if !self.session.reserve(player).contains(&kind) {
            return;
        }
        self.touch_clock();
        self.selected_reserve = if self.selected_reserve == Some(kind) {
            None
        } else {
            Some(kind)
        };
        self.selected_cell = None;
    }

    /// A board cell was tapped: select, deselect, place, or move.
    pub fn cell_tapped(&mut self, square: Square) {
        if self.session.is_finished() || !self.my_turn() {
            return;
        }
        let mover = self.session.current_player();
        let occupant = self.session.board().get(square);

        // Placing from reserve.
        if let Some(kind) = self.selected_reserve {
            if occupant.is_none() {
                self.touch_clock();
                self.selected_reserve = None;
                self.dispatch(Action::Place { index: square, piece: kind });
                return;
            }
            // Tapping one's own piece cancels the reserve selection and
            // selects the board piece instead.
            if occupant.is_some_and(|p| p.owner == mover) {
                self.selected_reserve = None;
                self.touch_clock();
                self.selected_cell = Some(square);
            }
            return;
        }

        let Some(selected) = self.selected_cell else {
            if occupant.is_some_and(|p| p.owner == mover) {
                self.touch_clock();
                self.selected_cell = Some(square);
            }
            return;
        };

        // Tapping the selection again deselects.
        if selected == square {
            self.selected_cell = None;
            return;
        }

        // Switch selection to another of one's own pieces.
        if occupant.is_some_and(|p| p.owner == mover) {
            self.selected_cell = Some(square);
            return;
        }

        if self.session.in_opening_phase() {
            self.selected_cell = None;
            self.status = MoveError::OpeningPhase.to_string();
            return;
        }

        if is_legal_move(self.session.board(), selected, square, mover) {
            self.dispatch(Action::Move { from: selected, to: square });
        } else {
            self.selected_cell = None;
        }
    }

    /// The menu's start button: configure and start a game.
    ///
    /// Offline this starts immediately. Online only the host (White) may
    /// start, and only once the room is ready; the host announces the
    /// sanitized settings before the start so both peers reconstruct the
    /// same fresh session.
    pub fn menu_start(&mut self, settings: Settings) {
        if let Some(room) = &self.room {
            if !room.ready {
                return;
            }
            if room.role != Player::White {
                self.status = "Waiting for host to start...".to_string();
                return;
            }
        }
        let settings = settings.sanitize();
        self.dispatch(Action::SyncSettings { settings });
        self.dispatch(Action::StartGame);
    }

    /// The menu's restart button. Either side may restart.
    pub fn menu_restart(&mut self) {
        self.dispatch(Action::Restart);
    }

    /// The menu's swap-sides button. Online-only, needs a ready room.
    pub fn menu_swap_sides(&mut self) {
        if self.room.as_ref().is_some_and(|r| r.ready) {
            self.dispatch(Action::SwapSides);
        }
    }

    // === Relay delivery ===

    /// Process one relay event. Called in arrival order, never re-entered.
    pub fn handle_event(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::RoomCreated { code, role, self_id } => {
                debug!(%code, %role, "room created");
                self.status = format!("Room created. Share code: {code}. Waiting for opponent...");
                self.room = Some(Room { code, role, ready: false, self_id });
            }
            RelayEvent::RoomJoined { code, role, self_id } => {
                debug!(%code, %role, "room joined");
                self.status = format!("Joined room {code}. Waiting for host to start...");
                self.room = Some(Room { code, role, ready: false, self_id });
            }
            RelayEvent::RoomReady { .. } => {
                if let Some(room) = &mut self.room {
                    room.ready = true;
                    self.status = match room.role {
                        Player::White => {
                            "Opponent joined. You are White. Configure options, then start."
                                .to_string()
                        }
                        Player::Black => {
                            "Connected. You are Black. Waiting for host to start...".to_string()
                        }
                    };
                }
            }
            RelayEvent::RolesUpdated { roles, .. } => {
                if let Some(room) = &mut self.room {
                    if let Some(&role) = roles.get(&room.self_id) {
                        room.role = role;
                        self.status = format!("Sides swapped. You are now {role}.");
                    }
                }
            }
            RelayEvent::OpponentLeft => {
                if let Some(room) = &mut self.room {
                    room.ready = false;
                }
                self.status = "Opponent left. Waiting for opponent...".to_string();
            }
            RelayEvent::RoomError { message } => {
                warn!(%message, "relay error");
                self.status = format!("Online error: {message}");
            }
            RelayEvent::Action { action } => self.apply(action),
        }
    }

    /// Deliver one clock tick from the hosting event loop.
    pub fn tick(&mut self, token: TickToken) {
        if let TickOutcome::Expired(loser) = self.clock.tick(token) {
            self.session.timeout(loser);
            self.clock.stop();
            self.update_status();
        }
    }

    // === Action application ===

    /// Apply one action to the session/clock pair.
    ///
    /// This is the single transition function shared by the offline path
    /// and relay delivery; exhaustive over the closed action set.
    pub fn apply(&mut self, action: Action) {
        debug!(?action, "apply");
        self.history.push_back(action.clone());

        match action {
            Action::Place { index, piece } => {
                self.clear_selection();
                match self.session.place(index, piece) {
                    Ok(event) => self.after_turn(event),
                    Err(error) => warn!(%error, "place rejected"),
                }
            }
            Action::Move { from, to } => {
                self.clear_selection();
                match self.session.try_move(from, to) {
                    Ok(event) => self.after_turn(event),
                    Err(error) => warn!(%error, "move rejected"),
                }
            }
            Action::ClockStart => {
                if !self.session.is_finished() {
                    self.clock.start_if_needed(self.session.current_player());
                }
            }
            Action::Restart | Action::StartGame => self.reset_game(),
            Action::SyncSettings { settings } => {
                self.settings = settings.sanitize();
            }
            Action::SwapSides => {
                if let Some(room) = &mut self.room {
                    room.role = room.role.opponent();
                    self.status = format!("Sides swapped. You are now {}.", room.role);
                }
            }
        }
    }

    /// Identical deterministic reset on `start-game` and `restart`: both
    /// peers rebuild the session from the current settings, so no board
    /// state ever crosses the wire.
    fn reset_game(&mut self) {
        self.clock.stop();
        self.session = Session::new(&self.settings);
        self.clock.reset(&self.settings);
        self.clear_selection();
        self.update_status();
    }

    fn after_turn(&mut self, event: TurnEvent) {
        match event {
            TurnEvent::Advanced { mover } => {
                self.clock.credit(mover);
                self.clock.retarget(self.session.current_player());
            }
            TurnEvent::Finished => self.clock.stop(),
        }
        self.update_status();
    }

    fn clear_selection(&mut self) {
        self.selected_cell = None;
        self.selected_reserve = None;
    }

    /// Originate an action: apply immediately offline, or send and wait
    /// for the relay echo online.
    fn dispatch(&mut self, action: Action) {
        match &self.room {
            None => self.apply(action),
            Some(room) => {
                let room_code = room.code.clone();
                if let Err(error) = self.link.send(ClientCommand::Action {
                    room: room_code,
                    action,
                }) {
                    warn!(%error, "send failed");
                    self.status = format!("Online error: {error}");
                }
            }
        }
    }

    /// White's first touch starts the clock, as an explicit action so both
    /// peers start from the same point in the stream.
    fn touch_clock(&mut self) {
        if !self.clock.enabled() || self.clock.started() || self.session.is_finished() {
            return;
        }
        if self.session.current_player() != Player::White {
            return;
        }
        // Online, only the White seat originates the start.
        if self.room.as_ref().is_some_and(|r| r.role != Player::White) {
            return;
        }
        self.dispatch(Action::ClockStart);
    }

    fn update_status(&mut self) {
        let current = self.session.current_player();
        self.status = match self.session.outcome() {
            Outcome::Win { winner, .. } => format!("{winner} wins!"),
            Outcome::Draw => "Draw!".to_string(),
            Outcome::Timeout { winner } => format!("{winner} wins on time!"),
            Outcome::InProgress => {
                if self.session.in_opening_phase() {
                    format!(
                        "{current}'s turn - place a piece ({}/{})",
                        self.session.turn_count(current),
                        self.settings.opening_turns
                    )
                } else if !self.my_turn() {
                    format!("Opponent's turn ({current})")
                } else {
                    format!("{current}'s turn")
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PieceMode;

    fn square(index: u8) -> Square {
        Square::new(index).unwrap()
    }

    #[test]
    fn test_offline_place_via_taps() {
        let mut driver = GameDriver::offline(Settings::default());

        driver.reserve_tapped(Player::White, PieceKind::Rook);
        assert_eq!(driver.snapshot().selected_reserve, Some(PieceKind::Rook));

        driver.cell_tapped(square(0));
        let snapshot = driver.snapshot();
        assert_eq!(snapshot.board.get(square(0)).map(|p| p.kind), Some(PieceKind::Rook));
        assert_eq!(snapshot.current_player, Player::Black);
        assert_eq!(snapshot.selected_reserve, None);
        assert_eq!(driver.history().len(), 1);
    }

    #[test]
    fn test_reserve_tap_toggles() {
        let mut driver = GameDriver::offline(Settings::default());

        driver.reserve_tapped(Player::White, PieceKind::Pawn);
        driver.reserve_tapped(Player::White, PieceKind::Pawn);
        assert_eq!(driver.snapshot().selected_reserve, None);
    }

    #[test]
    fn test_tap_wrong_side_ignored() {
        let mut driver = GameDriver::offline(Settings::default());

        driver.reserve_tapped(Player::Black, PieceKind::Pawn);
        assert_eq!(driver.snapshot().selected_reserve, None);
    }

    #[test]
    fn test_cell_tap_selects_then_deselects_board_piece() {
        let mut driver = GameDriver::offline(Settings::default());
        driver.reserve_tapped(Player::White, PieceKind::Rook);
        driver.cell_tapped(square(0));
        driver.reserve_tapped(Player::Black, PieceKind::Pawn);
        driver.cell_tapped(square(8));

        // White selects the rook, then taps it again to deselect.
        driver.cell_tapped(square(0));
        assert_eq!(driver.snapshot().selected_cell, Some(square(0)));
        driver.cell_tapped(square(0));
        assert_eq!(driver.snapshot().selected_cell, None);
    }

    #[test]
    fn test_opening_phase_tap_sets_status() {
        let settings = Settings {
            opening_turns: 2,
            ..Settings::default()
        };
        let mut driver = GameDriver::offline(settings);
        driver.reserve_tapped(Player::White, PieceKind::Rook);
        driver.cell_tapped(square(0));
        driver.reserve_tapped(Player::Black, PieceKind::Rook);
        driver.cell_tapped(square(8));

        // White tries to move the placed rook during the opening.
        driver.cell_tapped(square(0));
        driver.cell_tapped(square(1));

        let snapshot = driver.snapshot();
        assert!(snapshot.board.get(square(1)).is_none());
        assert_eq!(snapshot.status, "opening phase: place pieces before moving");
    }

    #[test]
    fn test_menu_start_applies_sanitized_settings() {
        let mut driver = GameDriver::offline(Settings::default());
        driver.menu_start(Settings {
            opening_turns: 99,
            ..Settings::default()
        });

        assert_eq!(driver.settings().opening_turns, 4);
        assert!(driver.session().in_opening_phase());
        assert_eq!(driver.history().len(), 2); // sync-settings, start-game
    }

    #[test]
    fn test_custom_pieces_flow_into_session() {
        let mut driver = GameDriver::offline(Settings::default());
        driver.menu_start(Settings {
            piece_mode: PieceMode::Custom,
            custom_pieces: smallvec::SmallVec::from_slice(&[PieceKind::Queen; 4]),
            ..Settings::default()
        });

        assert_eq!(&driver.session().reserve(Player::White)[..], &[PieceKind::Queen; 4]);
    }

    #[test]
    fn test_swap_sides_offline_is_noop() {
        let mut driver = GameDriver::offline(Settings::default());
        driver.menu_swap_sides();
        assert!(driver.history().is_empty());
    }
}
