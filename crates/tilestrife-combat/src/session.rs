//! Per-room session state the combat engine operates on.

use serde::{Deserialize, Serialize};
use tilestrife_protocol::{GameMap, Player, PlayerId, RoomId};

/// The win condition a room plays under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// First to the fixed victory threshold wins.
    #[default]
    Classic,
    /// Win condition evaluated by the external orchestrator.
    CaptureTheFlag,
}

/// One room's live game state: the map, the players, and whose
/// movement turn it is.
///
/// Rooms never share state; each is owned by exactly one task.
#[derive(Debug, Clone)]
pub struct GameRoom {
    /// The room's unique ID.
    pub id: RoomId,
    /// The grid being played on.
    pub map: GameMap,
    /// Everyone in the room, bots included.
    pub players: Vec<Player>,
    /// The win condition.
    pub mode: GameMode,
    /// The player whose movement turn is running, if any.
    pub active_player: Option<PlayerId>,
}

impl GameRoom {
    /// Creates a room over a map and player list.
    pub fn new(id: RoomId, map: GameMap, players: Vec<Player>, mode: GameMode) -> Self {
        Self {
            id,
            map,
            players,
            mode,
            active_player: None,
        }
    }

    /// Looks up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Looks up a player by id, mutably.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// How many participants still count toward the game (connected
    /// humans, admins, bots).
    pub fn active_participants(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }
}
