//! Collaborator interfaces the combat engine depends on.
//!
//! The engine owns the *scheduling decisions*; the orchestrator owns
//! the timers, the turn system, and the broadcast channel. The log sink
//! is fire-and-forget; nothing it returns is ever depended on.

use std::time::Duration;

use tilestrife_protocol::{GameEvent, Player, PlayerId, RollResult, RoomId};

use crate::GameRoom;

/// The turn/room orchestrator surface the combat engine calls out to.
///
/// Implemented by the room runtime in production and by a recording
/// double in tests.
pub trait Orchestrator {
    /// The player whose *movement* turn is running, if any.
    fn active_player(&self, room: &GameRoom) -> Option<PlayerId> {
        room.active_player
    }

    /// The current movement turn is over; advance the turn system.
    fn on_turn_ended(&mut self, room: &mut GameRoom);

    /// The game has been won.
    fn on_end_game(&mut self, room: &mut GameRoom, winner: PlayerId);

    /// Remove a player from the running game.
    fn leave_player_from_game(&mut self, room: &mut GameRoom, player_id: PlayerId);

    /// Arm the room's fight timer for `duration`.
    fn reset_fight_timer(&mut self, room_id: RoomId, duration: Duration);

    /// Disarm the room's fight timer.
    fn stop_fight_timer(&mut self, room_id: RoomId);

    /// Time left on the room's fight timer.
    fn fight_time_remaining(&self, room_id: RoomId) -> Duration;

    /// Freeze the movement turn timer while a fight runs.
    fn pause_turn_timer(&mut self, room_id: RoomId);

    /// Resume the movement turn timer after a fight.
    fn resume_turn_timer(&mut self, room_id: RoomId);

    /// Call the engine's turn-start back after `delay` (lets the
    /// client-side roll animation finish).
    fn schedule_combat_turn(&mut self, room_id: RoomId, delay: Duration);

    /// Stop every timer the room owns.
    fn stop_game_timers(&mut self, room_id: RoomId);

    /// Broadcast an event to everyone in the room.
    fn emit_to_room(&mut self, room_id: RoomId, event: GameEvent);

    /// Send an event to a single player's connection.
    fn emit_to_player(&mut self, player_id: PlayerId, event: GameEvent);

    /// Reset the room's per-match counters. Default: no-op.
    fn reset_global_stats(&mut self, _room: &mut GameRoom) {}

    /// Drop a player's carried items back onto the grid. Default:
    /// no-op.
    fn place_items_on_ground(&mut self, _room: &mut GameRoom, _player_id: PlayerId) {}
}

/// Fire-and-forget combat logging sink.
///
/// Every method has a no-op default so implementations pick what they
/// care about.
pub trait CombatLog {
    /// An attack was rolled.
    fn send_combat_action_log(
        &mut self,
        _room_id: RoomId,
        _attacker: &Player,
        _defender: &Player,
        _attack: &RollResult,
        _defense: &RollResult,
    ) {
    }

    /// An attack or evasion resolved.
    fn send_combat_result_log(&mut self, _room_id: RoomId, _player: &Player, _message: &str) {}

    /// A fight started or concluded.
    fn send_global_combat_log(
        &mut self,
        _room_id: RoomId,
        _first: &Player,
        _second: &Player,
        _message: &str,
    ) {
    }

    /// A player-level lifecycle note (disconnection, default win).
    fn send_player_log(&mut self, _room_id: RoomId, _player: &Player, _message: &str) {}

    /// The game ended.
    fn send_end_game_log(&mut self, _room_id: RoomId, _winner: &Player) {}
}

/// A [`CombatLog`] that writes structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCombatLog;

impl CombatLog for TracingCombatLog {
    fn send_combat_action_log(
        &mut self,
        room_id: RoomId,
        attacker: &Player,
        defender: &Player,
        attack: &RollResult,
        defense: &RollResult,
    ) {
        tracing::info!(
            %room_id,
            attacker = %attacker.id,
            defender = %defender.id,
            attack_total = attack.total,
            defense_total = defense.total,
            "combat action"
        );
    }

    fn send_combat_result_log(&mut self, room_id: RoomId, player: &Player, message: &str) {
        tracing::info!(%room_id, player = %player.id, message, "combat result");
    }

    fn send_global_combat_log(
        &mut self,
        room_id: RoomId,
        first: &Player,
        second: &Player,
        message: &str,
    ) {
        tracing::info!(
            %room_id,
            first = %first.id,
            second = %second.id,
            message,
            "combat"
        );
    }

    fn send_player_log(&mut self, room_id: RoomId, player: &Player, message: &str) {
        tracing::info!(%room_id, player = %player.id, message, "player");
    }

    fn send_end_game_log(&mut self, room_id: RoomId, winner: &Player) {
        tracing::info!(%room_id, winner = %winner.id, "game ended");
    }
}
