//! Players: attributes, inventory, behavior, status, and match stats.

use serde::{Deserialize, Serialize};

use crate::{Item, PlayerId, Position};

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A player's live combat and movement attributes.
///
/// `current_hp` is clamped to `[0, total_hp]` by the combat engine;
/// attack and defense are signed because penalties (ice, Xiphos) can
/// push them below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Current hit points, `0..=total_hp`.
    pub current_hp: u32,
    /// Maximum hit points.
    pub total_hp: u32,
    /// Decides who attacks first when a fight starts.
    pub speed: u32,
    /// Base attack value added to the attack die.
    pub attack: i32,
    /// Base defense value added to the defense die.
    pub defense: i32,
    /// Attack die rolls uniformly in `1..=attack_dice`.
    pub attack_dice: u32,
    /// Defense die rolls uniformly in `1..=defense_dice`.
    pub defense_dice: u32,
    /// Actions (attack / door toggle) available this turn.
    pub action_points: u32,
    /// Movement budget left this turn, in tile-cost units.
    pub movement_points_left: u32,
    /// Evasion attempts left in the current fight.
    pub evasions_left: u8,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            current_hp: 4,
            total_hp: 4,
            speed: 4,
            attack: 4,
            defense: 4,
            attack_dice: 6,
            defense_dice: 4,
            action_points: 1,
            movement_points_left: 4,
            evasions_left: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Behavior and status
// ---------------------------------------------------------------------------

/// How a bot plays. Only meaningful when the player's status is
/// [`PlayerStatus::Bot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// A human-controlled player (the default).
    #[default]
    Sentient,
    /// Seeks out and attacks opponents.
    Aggressive,
    /// Avoids fights; evades when damaged.
    Defensive,
}

/// A player's connection/role status within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// An ordinary connected human.
    Regular,
    /// The room's administrator.
    Admin,
    /// A server-controlled bot.
    Bot,
    /// Fully disconnected.
    Disconnected,
    /// Disconnected but within the grace window.
    PendingDisconnection,
}

impl PlayerStatus {
    /// Returns `true` for participants that still count toward the
    /// game: connected humans, admins, and bots.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Regular | Self::Admin | Self::Bot)
    }
}

// ---------------------------------------------------------------------------
// Match stats
// ---------------------------------------------------------------------------

/// Per-player counters accumulated over a match, reported post-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchStats {
    /// Fights entered.
    pub combats: u32,
    /// Fights won.
    pub victories: u32,
    /// Fights lost.
    pub defeats: u32,
    /// Damage applied to opponents.
    pub damage_dealt: u32,
    /// Damage received (including Achilles Armor self-damage).
    pub damage_taken: u32,
    /// Successful escapes from combat.
    pub evasions: u32,
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A player in a room: identity, grid placement, attributes, inventory,
/// and accumulated stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identity within the server.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current grid position.
    pub position: Position,
    /// Where this player respawns after losing a fight.
    pub spawn_position: Position,
    /// Live attributes.
    pub attributes: Attributes,
    /// Carried items.
    pub inventory: Vec<Item>,
    /// Bot behavior profile.
    pub behavior: Behavior,
    /// Connection/role status.
    pub status: PlayerStatus,
    /// Match counters.
    pub stats: MatchStats,
}

impl Player {
    /// Creates a player at a spawn position with default attributes.
    pub fn new(id: PlayerId, name: impl Into<String>, spawn: Position) -> Self {
        Self {
            id,
            name: name.into(),
            position: spawn,
            spawn_position: spawn,
            attributes: Attributes::default(),
            inventory: Vec::new(),
            behavior: Behavior::default(),
            status: PlayerStatus::Regular,
            stats: MatchStats::default(),
        }
    }

    /// Returns `true` if the inventory contains the item.
    pub fn has_item(&self, item: Item) -> bool {
        self.inventory.contains(&item)
    }

    /// Returns `true` for server-controlled bots.
    pub fn is_bot(&self) -> bool {
        self.status == PlayerStatus::Bot
    }

    /// Returns `true` while the player counts as a live participant.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns `true` once the player has taken any damage.
    pub fn is_damaged(&self) -> bool {
        self.attributes.current_hp < self.attributes.total_hp
    }
}
