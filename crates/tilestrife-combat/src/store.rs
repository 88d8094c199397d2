//! The room-keyed combat store and the per-fight record.

use std::collections::HashMap;

use tilestrife_protocol::{PlayerId, RoomId};

/// The mutable state of one running fight.
///
/// `attacker` is whichever participant holds the current combat turn;
/// [`swap_turn`](Self::swap_turn) exchanges the roles. The applied-effect
/// lists exist so everything a fight did to the players can be reverted
/// when it ends.
#[derive(Debug, Clone)]
pub struct CombatRecord {
    /// The room this fight belongs to.
    pub room_id: RoomId,
    /// Current turn holder.
    pub attacker: PlayerId,
    /// The participant waiting to respond.
    pub defender: PlayerId,
    /// Whether the previous turn ended on a failed evasion.
    pub fail_evasion: bool,
    /// Participants with an active Xiphos effect.
    pub xiphos_holders: Vec<PlayerId>,
    /// Participants carrying the ice-tile penalty.
    pub ice_penalized: Vec<PlayerId>,
}

impl CombatRecord {
    /// Creates a fresh record with `first` holding the opening turn.
    pub fn new(room_id: RoomId, first: PlayerId, second: PlayerId) -> Self {
        Self {
            room_id,
            attacker: first,
            defender: second,
            fail_evasion: false,
            xiphos_holders: Vec::new(),
            ice_penalized: Vec::new(),
        }
    }

    /// Returns `true` if the player is one of the two participants.
    pub fn involves(&self, player_id: PlayerId) -> bool {
        self.attacker == player_id || self.defender == player_id
    }

    /// The other participant, or `None` for a non-participant.
    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        if player_id == self.attacker {
            Some(self.defender)
        } else if player_id == self.defender {
            Some(self.attacker)
        } else {
            None
        }
    }

    /// Hands the turn to the other participant.
    pub fn swap_turn(&mut self) {
        std::mem::swap(&mut self.attacker, &mut self.defender);
    }
}

/// All live fights, keyed by room.
///
/// The engine's only shared resource across rooms: each room has at
/// most one entry, and entries never interact. Owned by the engine so
/// its lifecycle is the server instance's, not a process-global's.
#[derive(Debug, Default)]
pub struct CombatStore {
    records: HashMap<RoomId, CombatRecord>,
}

impl CombatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The room's live fight, if any.
    pub fn get(&self, room_id: RoomId) -> Option<&CombatRecord> {
        self.records.get(&room_id)
    }

    /// The room's live fight, mutably.
    pub fn get_mut(&mut self, room_id: RoomId) -> Option<&mut CombatRecord> {
        self.records.get_mut(&room_id)
    }

    /// Whether the room has a live fight.
    pub fn contains(&self, room_id: RoomId) -> bool {
        self.records.contains_key(&room_id)
    }

    /// Whether the player is fighting in this room right now.
    pub fn is_in_combat(&self, room_id: RoomId, player_id: PlayerId) -> bool {
        self.get(room_id).is_some_and(|r| r.involves(player_id))
    }

    /// Installs a fight record. Refuses a second fight in the same
    /// room: the at-most-one-per-room invariant.
    pub fn insert(&mut self, record: CombatRecord) -> bool {
        if self.records.contains_key(&record.room_id) {
            return false;
        }
        let _ = self.records.insert(record.room_id, record);
        true
    }

    /// Removes and returns the room's fight record.
    pub fn remove(&mut self, room_id: RoomId) -> Option<CombatRecord> {
        self.records.remove(&room_id)
    }

    /// Number of rooms currently fighting.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no fights are live.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roles_and_swap() {
        let mut rec = CombatRecord::new(RoomId(1), PlayerId(10), PlayerId(20));
        assert!(rec.involves(PlayerId(10)));
        assert!(!rec.involves(PlayerId(30)));
        assert_eq!(rec.opponent_of(PlayerId(10)), Some(PlayerId(20)));
        assert_eq!(rec.opponent_of(PlayerId(30)), None);

        rec.swap_turn();
        assert_eq!(rec.attacker, PlayerId(20));
        assert_eq!(rec.defender, PlayerId(10));
    }

    #[test]
    fn test_store_rejects_second_fight_per_room() {
        let mut store = CombatStore::new();
        assert!(store.insert(CombatRecord::new(RoomId(1), PlayerId(1), PlayerId(2))));
        assert!(!store.insert(CombatRecord::new(RoomId(1), PlayerId(3), PlayerId(4))));
        assert_eq!(store.len(), 1);
        // The original record survives.
        assert_eq!(store.get(RoomId(1)).unwrap().attacker, PlayerId(1));
    }

    #[test]
    fn test_rooms_are_independent() {
        let mut store = CombatStore::new();
        assert!(store.insert(CombatRecord::new(RoomId(1), PlayerId(1), PlayerId(2))));
        assert!(store.insert(CombatRecord::new(RoomId(2), PlayerId(1), PlayerId(2))));
        assert!(store.remove(RoomId(1)).is_some());
        assert!(store.contains(RoomId(2)));
        assert!(store.remove(RoomId(1)).is_none());
    }

    #[test]
    fn test_is_in_combat() {
        let mut store = CombatStore::new();
        let _ = store.insert(CombatRecord::new(RoomId(7), PlayerId(1), PlayerId(2)));
        assert!(store.is_in_combat(RoomId(7), PlayerId(2)));
        assert!(!store.is_in_combat(RoomId(7), PlayerId(3)));
        assert!(!store.is_in_combat(RoomId(8), PlayerId(1)));
    }
}
