//! The countdown clock.
//!
//! The clock never schedules anything itself: the hosting event loop owns
//! the periodic timer and delivers 1-second ticks. What the clock owns is
//! the *right* for a tick to count. Every (re)start mints a fresh
//! `TickToken`; stopping or retargeting invalidates all outstanding
//! tokens, so a stale scheduled callback can never decrement anyone.
//! Stop-before-start is therefore structural, not a call-site convention.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::player::{Player, PlayerMap};
use crate::core::settings::Settings;

/// Proof that a tick delivery belongs to the current ticker.
///
/// Obtained from [`Clock::current_token`] when (re)starting; carried by the
/// host's scheduled callback; checked by [`Clock::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickToken {
    generation: u64,
}

/// Result of delivering one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale token or clock not running; nothing changed.
    Ignored,
    /// One second came off `.0`'s remaining time.
    Ticked(Player),
    /// `.0`'s time reached zero; the clock has stopped.
    Expired(Player),
}

/// Per-player countdown with increment-on-move and lazy start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    enabled: bool,
    increment: u32,
    remaining: PlayerMap<u32>,
    started: bool,
    ticking: Option<Player>,
    generation: u64,
}

impl Clock {
    /// A clock matching the settings. Disabled clocks never run.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            enabled: settings.clock_on,
            increment: settings.clock_increment,
            remaining: PlayerMap::with_value(settings.clock_seconds),
            started: false,
            ticking: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// True once the one-shot lazy start has happened this game.
    #[must_use]
    pub fn started(&self) -> bool {
        self.started
    }

    /// Seconds left for a player.
    #[must_use]
    pub fn remaining(&self, player: Player) -> u32 {
        self.remaining[player]
    }

    /// Whose time is currently running, if any.
    #[must_use]
    pub fn ticking(&self) -> Option<Player> {
        self.ticking
    }

    /// The token a tick must carry to count, while running.
    #[must_use]
    pub fn current_token(&self) -> Option<TickToken> {
        self.ticking.map(|_| TickToken {
            generation: self.generation,
        })
    }

    /// One-shot lazy start on White's first touch.
    ///
    /// Returns the new token if this call started the clock; `None` if
    /// disabled or already started.
    pub fn start_if_needed(&mut self, target: Player) -> Option<TickToken> {
        if !self.enabled || self.started {
            return None;
        }
        self.started = true;
        debug!(%target, "clock started");
        Some(self.start(target))
    }

    /// Switch the ticking target on a turn advance.
    ///
    /// No-op until the clock has started. The previous ticker is stopped
    /// first: its tokens go stale before the new one is minted.
    pub fn retarget(&mut self, target: Player) -> Option<TickToken> {
        if !self.enabled || !self.started {
            return None;
        }
        Some(self.start(target))
    }

    /// Stop ticking. All outstanding tokens become stale.
    pub fn stop(&mut self) {
        self.ticking = None;
    }

    /// Fresh game, same clock identity: remaining time and the one-shot
    /// start reset, but the generation keeps counting so tokens minted
    /// before the reset can never match a later start.
    pub fn reset(&mut self, settings: &Settings) {
        self.enabled = settings.clock_on;
        self.increment = settings.clock_increment;
        self.remaining = PlayerMap::with_value(settings.clock_seconds);
        self.started = false;
        self.ticking = None;
    }

    /// Credit the mover's increment on a turn advance.
    pub fn credit(&mut self, player: Player) {
        if self.enabled {
            self.remaining[player] += self.increment;
        }
    }

    /// Deliver one 1-second tick.
    ///
    /// Decrements exactly the targeted player, clamping at zero. On expiry
    /// the clock stops itself and reports the loser; the caller transitions
    /// the session to a timeout.
    pub fn tick(&mut self, token: TickToken) -> TickOutcome {
        let Some(target) = self.ticking else {
            return TickOutcome::Ignored;
        };
        if token.generation != self.generation {
            return TickOutcome::Ignored;
        }

        self.remaining[target] = self.remaining[target].saturating_sub(1);
        if self.remaining[target] == 0 {
            self.stop();
            debug!(loser = %target, "clock expired");
            return TickOutcome::Expired(target);
        }
        TickOutcome::Ticked(target)
    }

    /// `mm:ss` display for a player's remaining time.
    #[must_use]
    pub fn format_remaining(&self, player: Player) -> String {
        let seconds = self.remaining[player];
        format!("{:02}:{:02}", seconds / 60, seconds % 60)
    }

    fn start(&mut self, target: Player) -> TickToken {
        self.ticking = Some(target);
        self.generation += 1;
        TickToken {
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_settings(seconds: u32, increment: u32) -> Settings {
        Settings {
            clock_on: true,
            clock_seconds: seconds,
            clock_increment: increment,
            ..Settings::default()
        }
    }

    #[test]
    fn test_disabled_clock_never_starts() {
        let mut clock = Clock::new(&Settings::default());
        assert!(clock.start_if_needed(Player::White).is_none());
        assert!(!clock.started());
        assert!(clock.retarget(Player::Black).is_none());
    }

    #[test]
    fn test_lazy_start_is_one_shot() {
        let mut clock = Clock::new(&clock_settings(60, 0));

        assert!(clock.start_if_needed(Player::White).is_some());
        assert!(clock.started());
        assert!(clock.start_if_needed(Player::White).is_none());
    }

    #[test]
    fn test_tick_decrements_only_target() {
        let mut clock = Clock::new(&clock_settings(60, 0));
        let token = clock.start_if_needed(Player::White).unwrap();

        assert_eq!(clock.tick(token), TickOutcome::Ticked(Player::White));
        assert_eq!(clock.remaining(Player::White), 59);
        assert_eq!(clock.remaining(Player::Black), 60);
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut clock = Clock::new(&clock_settings(60, 0));
        let old = clock.start_if_needed(Player::White).unwrap();
        let new = clock.retarget(Player::Black).unwrap();

        assert_eq!(clock.tick(old), TickOutcome::Ignored);
        assert_eq!(clock.remaining(Player::White), 60);
        assert_eq!(clock.tick(new), TickOutcome::Ticked(Player::Black));
    }

    #[test]
    fn test_stop_invalidates_tokens() {
        let mut clock = Clock::new(&clock_settings(60, 0));
        let token = clock.start_if_needed(Player::White).unwrap();

        clock.stop();
        assert_eq!(clock.tick(token), TickOutcome::Ignored);
        assert_eq!(clock.current_token(), None);
    }

    #[test]
    fn test_expiry_clamps_and_stops() {
        let mut clock = Clock::new(&clock_settings(10, 0));
        let token = clock.start_if_needed(Player::White).unwrap();

        for _ in 0..9 {
            assert_eq!(clock.tick(token), TickOutcome::Ticked(Player::White));
        }
        assert_eq!(clock.tick(token), TickOutcome::Expired(Player::White));
        assert_eq!(clock.remaining(Player::White), 0);

        // No further decrement after expiry.
        assert_eq!(clock.tick(token), TickOutcome::Ignored);
        assert_eq!(clock.remaining(Player::White), 0);
    }

    #[test]
    fn test_reset_keeps_tokens_stale() {
        let mut clock = Clock::new(&clock_settings(60, 0));
        let old = clock.start_if_needed(Player::White).unwrap();

        clock.reset(&clock_settings(60, 0));
        assert!(!clock.started());
        assert_eq!(clock.remaining(Player::White), 60);

        // A token from before the reset never matches a post-reset start.
        let new = clock.start_if_needed(Player::White).unwrap();
        assert_ne!(old, new);
        assert_eq!(clock.tick(old), TickOutcome::Ignored);
        assert_eq!(clock.tick(new), TickOutcome::Ticked(Player::White));
    }

    #[test]
    fn test_credit_applies_increment() {
        let mut clock = Clock::new(&clock_settings(60, 5));
        clock.credit(Player::White);
        assert_eq!(clock.remaining(Player::White), 65);

        let mut off = Clock::new(&Settings::default());
        off.credit(Player::White);
        assert_eq!(off.remaining(Player::White), 180);
    }

    #[test]
    fn test_format_remaining() {
        let clock = Clock::new(&clock_settings(185, 0));
        assert_eq!(clock.format_remaining(Player::White), "03:05");

        let short = Clock::new(&clock_settings(10, 0));
        assert_eq!(short.format_remaining(Player::Black), "00:10");
    }
}
