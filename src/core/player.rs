//! Player identification and per-player data storage.
//!
//! ## Player
//!
//! The two sides of the game. White always moves first.
//!
//! ## PlayerMap
//!
//! Two-slot per-player storage indexable by `Player`. Reserves, turn
//! counters, and clock times all live in one of these.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two sides.
///
/// Serialized as `"white"` / `"black"` to match the wire protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// Both players in turn order.
    pub const ALL: [Player; 2] = [Player::White, Player::Black];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::White => write!(f, "White"),
            Player::Black => write!(f, "Black"),
        }
    }
}

/// Per-player data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use quartz::core::{Player, PlayerMap};
///
/// let mut time: PlayerMap<u32> = PlayerMap::with_value(180);
/// time[Player::Black] = 150;
///
/// assert_eq!(time[Player::White], 180);
/// assert_eq!(time[Player::Black], 150);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    white: T,
    black: T,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(factory: impl Fn(Player) -> T) -> Self {
        Self {
            white: factory(Player::White),
            black: factory(Player::Black),
        }
    }

    /// Create a new PlayerMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            white: value.clone(),
            black: value,
        }
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: Player) -> &T {
        match player {
            Player::White => &self.white,
            Player::Black => &self.black,
        }
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: Player) -> &mut T {
        match player {
            Player::White => &mut self.white,
            Player::Black => &mut self.black,
        }
    }

    /// Iterate over (Player, &T) pairs in turn order.
    pub fn iter(&self) -> impl Iterator<Item = (Player, &T)> {
        Player::ALL.into_iter().map(move |p| (p, self.get(p)))
    }
}

impl<T: Default> Default for PlayerMap<T> {
    fn default() -> Self {
        Self::new(|_| T::default())
    }
}

impl<T> Index<Player> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: Player) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<Player> for PlayerMap<T> {
    fn index_mut(&mut self, player: Player) -> &mut Self::Output {
        self.get_mut(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent() {
        assert_eq!(Player::White.opponent(), Player::Black);
        assert_eq!(Player::Black.opponent(), Player::White);
        assert_eq!(Player::White.opponent().opponent(), Player::White);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Player::White), "White");
        assert_eq!(format!("{}", Player::Black), "Black");
    }

    #[test]
    fn test_player_map_factory() {
        let map = PlayerMap::new(|p| match p {
            Player::White => 1,
            Player::Black => 2,
        });

        assert_eq!(map[Player::White], 1);
        assert_eq!(map[Player::Black], 2);
    }

    #[test]
    fn test_player_map_mutation() {
        let mut map: PlayerMap<u32> = PlayerMap::with_value(0);

        map[Player::White] = 10;
        map[Player::Black] += 5;

        assert_eq!(map[Player::White], 10);
        assert_eq!(map[Player::Black], 5);
    }

    #[test]
    fn test_player_map_iter() {
        let map = PlayerMap::new(|p| p.opponent());
        let pairs: Vec<_> = map.iter().collect();

        assert_eq!(
            pairs,
            vec![
                (Player::White, &Player::Black),
                (Player::Black, &Player::White),
            ]
        );
    }

    #[test]
    fn test_player_serialization() {
        assert_eq!(serde_json::to_string(&Player::White).unwrap(), "\"white\"");
        let back: Player = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(back, Player::Black);
    }
}
