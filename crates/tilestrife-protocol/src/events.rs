//! The push-protocol events exchanged with clients.
//!
//! [`GameEvent`] is everything the server pushes into a room;
//! [`ClientAction`] is everything a client may request. Both are
//! adjacently tagged (`{"event": ..., "data": ...}`) so the client SDK
//! can dispatch on a single field.

use serde::{Deserialize, Serialize};

use crate::{Player, PlayerId, Position};

// ---------------------------------------------------------------------------
// Combat payloads
// ---------------------------------------------------------------------------

/// One side of a combat exchange: base attribute, die roll, and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// The base attack or defense attribute.
    pub base: i32,
    /// The die value rolled, `1..=dice_max`.
    pub dice_value: u32,
    /// `base + dice_value`.
    pub total: i32,
}

impl RollResult {
    /// Builds a result from a base attribute and a die value.
    pub fn new(base: i32, dice_value: u32) -> Self {
        Self {
            base,
            dice_value,
            total: base + dice_value as i32,
        }
    }
}

/// The two fight participants as a snapshot pair.
///
/// `attacker` is whichever participant holds the *current* combat turn;
/// the pair is re-emitted with roles swapped when the turn changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatPlayers {
    /// The participant whose turn it is.
    pub attacker: Player,
    /// The participant waiting to respond.
    pub defender: Player,
}

/// A grid click resolved into a fight intent: who clicked where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionData {
    /// The clicked tile.
    pub clicked_position: Position,
    /// The acting player.
    pub player_id: PlayerId,
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// Everything the server pushes to clients in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum GameEvent {
    /// A fight has started between two participants.
    StartFight {
        /// The participants, first turn-holder as `attacker`.
        combat_players: CombatPlayers,
        /// Whether the room's active player holds the first turn.
        is_active_player_attacker: bool,
    },

    /// Seconds remaining on the fight timer.
    CombatTime(u64),

    /// The dice have been rolled for an attack.
    AttackValues {
        /// Attacker's base, die, and total.
        attack_values: RollResult,
        /// Defender's base, die, and total.
        defense_values: RollResult,
    },

    /// The attack landed.
    AttackSuccess {
        /// Who attacked.
        attacker: PlayerId,
        /// Damage applied to the defender.
        damage: u32,
    },

    /// The attack failed (tie or defense won).
    AttackFail {
        /// Who attacked.
        attacker: PlayerId,
        /// Whether Achilles Armor redirected damage onto the attacker.
        should_damage_self: bool,
        /// Damage applied to the attacker when redirected.
        damage: u32,
    },

    /// A participant escaped; combat is over for both sides.
    EvasionSuccess {
        /// The room's players after the escape.
        list_players: Vec<Player>,
        /// Who escaped.
        player: Player,
    },

    /// An evasion attempt failed.
    EvasionFail(Player),

    /// A combat turn ended; roles have swapped.
    CombatTurnEnded {
        /// The participants, new turn-holder as `attacker`.
        combat_players: CombatPlayers,
        /// Whether the turn ended on a failed evasion.
        fail_evasion: bool,
    },

    /// The opponent disconnected; the remaining participant wins
    /// without further dice rolls.
    DefaultCombatWin,

    /// A defeated player has been moved back to a spawn-area tile.
    RespawnPlayer {
        /// Where the player stood when defeated.
        old_position: Position,
        /// The player after the respawn.
        player_to_replace: Player,
    },

    /// Tiles the active player can reach this turn.
    ReachableTiles(Vec<Position>),

    /// A fight concluded with a winner.
    CombatEnd {
        /// The room's players after the fight.
        list_players: Vec<Player>,
        /// The winner.
        player: Player,
    },

    /// Catch-up flag for a client joining mid-fight.
    CombatInProgress,

    /// Catch-up flag: no fight is running.
    CombatOver,
}

// ---------------------------------------------------------------------------
// Client → server actions
// ---------------------------------------------------------------------------

/// Everything a client may request of the room.
///
/// The sender's identity is attached by the connection layer, not
/// carried in the action itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data")]
pub enum ClientAction {
    /// A grid click that resolves to a fight against an adjacent
    /// opponent.
    FightAction {
        /// The clicked tile.
        clicked_position: Position,
    },

    /// Confirm an attack on the current combat turn.
    Attack,

    /// Attempt to evade on the current combat turn.
    Evade,

    /// Ask for the tiles reachable with the remaining movement points.
    RequestReachableTiles,

    /// Toggle an adjacent door.
    ToggleDoor {
        /// The door tile.
        position: Position,
    },

    /// Move along the cheapest path toward a destination.
    Move {
        /// The target tile.
        destination: Position,
    },

    /// Request a combat state snapshot (reconnection catch-up).
    SyncCombat,

    /// Leave the game.
    Leave,
}
