//! Room director: creates, tracks, and routes players to rooms.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tilestrife_combat::{DiceStrategy, GameMode, RandomDice};
use tilestrife_protocol::{ClientAction, GameMap, Player, PlayerId, RoomId};

use crate::actor::spawn_room;
use crate::orchestrate::PlayerSender;
use crate::{RoomError, RoomHandle, RoomInfo};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Manages all active rooms and tracks which player is in which room.
///
/// This is the entry point for room operations from higher layers
/// (connection handling, matchmaking).
pub struct RoomDirector<D = RandomDice> {
    /// Dice strategy installed into every new room.
    dice: D,

    /// Active rooms, keyed by room ID.
    rooms: HashMap<RoomId, RoomHandle>,

    /// Maps each player to the room they're currently in.
    /// A player can be in at most ONE room at a time.
    player_rooms: HashMap<PlayerId, RoomId>,
}

impl RoomDirector<RandomDice> {
    /// Creates a director whose rooms roll real dice.
    pub fn new() -> Self {
        Self::with_dice(RandomDice)
    }
}

impl Default for RoomDirector<RandomDice> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: DiceStrategy + Clone + 'static> RoomDirector<D> {
    /// Creates a director with a custom dice strategy (debug mode,
    /// tests).
    pub fn with_dice(dice: D) -> Self {
        Self {
            dice,
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
        }
    }

    /// Creates a new room over a map and returns its ID.
    pub fn create_room(&mut self, map: GameMap, mode: GameMode) -> RoomId {
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_room(
            room_id,
            map,
            mode,
            self.dice.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(room_id, handle);
        tracing::info!(%room_id, "room created");
        room_id
    }

    /// Adds a player to a room, enforcing the one-room-at-a-time
    /// invariant.
    pub async fn join_room(
        &mut self,
        player: Player,
        room_id: RoomId,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let player_id = player.id;
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, *current));
        }

        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        handle.join(player, sender).await?;
        self.player_rooms.insert(player_id, room_id);
        Ok(())
    }

    /// Routes a gameplay action from a player to their current room.
    pub async fn route_action(
        &self,
        player_id: PlayerId,
        action: ClientAction,
    ) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;

        let handle = self
            .rooms
            .get(room_id)
            .ok_or(RoomError::NotFound(*room_id))?;

        handle.action(player_id, action).await
    }

    /// Reports a player's connection as gone for good and drops them
    /// from the index.
    pub async fn disconnect(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .remove(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;

        if let Some(handle) = self.rooms.get(&room_id) {
            handle.disconnect(player_id).await?;
        }
        Ok(())
    }

    /// Returns metadata about a specific room.
    pub async fn room_info(&self, room_id: RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;
        handle.info().await
    }

    /// Shuts down a room and removes all its players from the index.
    pub async fn destroy_room(&mut self, room_id: RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(&room_id)
            .ok_or(RoomError::NotFound(room_id))?;

        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, rid| *rid != room_id);

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Returns the room ID a player is currently in, if any.
    pub fn player_room(&self, player_id: PlayerId) -> Option<RoomId> {
        self.player_rooms.get(&player_id).copied()
    }

    /// Returns a cloned handle to a room.
    pub fn handle(&self, room_id: RoomId) -> Option<RoomHandle> {
        self.rooms.get(&room_id).cloned()
    }

    /// Returns the number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
