//! The room actor's [`Orchestrator`] implementation.
//!
//! The combat engine is synchronous; the timers it steers live in the
//! actor's select loop. `LoopOrchestrator` bridges the two: engine
//! calls become queued [`Directive`]s plus a few latched flags, and the
//! actor drains them right after every engine call, on the same logical
//! thread.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tilestrife_combat::{GameRoom, Orchestrator};
use tilestrife_grid::NavigationEngine;
use tilestrife_protocol::{GameEvent, Item, MatchStats, PlayerId, RoomId};
use tokio::sync::mpsc;
use tracing::debug;

/// Channel sender for delivering game events to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<GameEvent>;

/// A timer instruction queued for the actor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    ResetFight(Duration),
    StopFight,
    PauseTurn,
    ResumeTurn,
    ScheduleCombatTurn(Duration),
    StopAll,
}

/// Orchestrator state owned by a single room actor.
pub struct LoopOrchestrator {
    directives: VecDeque<Directive>,
    /// Per-player outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    /// Fight-timer remainder, mirrored in by the actor before engine
    /// calls.
    fight_remaining: Duration,
    turn_ended: bool,
    game_over: Option<PlayerId>,
    departures: Vec<PlayerId>,
}

impl LoopOrchestrator {
    pub(crate) fn new() -> Self {
        Self {
            directives: VecDeque::new(),
            senders: HashMap::new(),
            fight_remaining: Duration::ZERO,
            turn_ended: false,
            game_over: None,
            departures: Vec::new(),
        }
    }

    pub(crate) fn insert_sender(&mut self, player_id: PlayerId, sender: PlayerSender) {
        self.senders.insert(player_id, sender);
    }

    pub(crate) fn remove_sender(&mut self, player_id: PlayerId) {
        self.senders.remove(&player_id);
    }

    /// Mirrors the live fight-timer remainder so the engine can read it.
    pub(crate) fn set_remaining(&mut self, fight: Duration) {
        self.fight_remaining = fight;
    }

    pub(crate) fn next_directive(&mut self) -> Option<Directive> {
        self.directives.pop_front()
    }

    pub(crate) fn take_turn_ended(&mut self) -> bool {
        std::mem::take(&mut self.turn_ended)
    }

    pub(crate) fn take_game_over(&mut self) -> Option<PlayerId> {
        self.game_over.take()
    }

    pub(crate) fn take_departures(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.departures)
    }
}

impl Orchestrator for LoopOrchestrator {
    fn on_turn_ended(&mut self, _room: &mut GameRoom) {
        self.turn_ended = true;
    }

    fn on_end_game(&mut self, _room: &mut GameRoom, winner: PlayerId) {
        self.game_over = Some(winner);
    }

    fn leave_player_from_game(&mut self, room: &mut GameRoom, player_id: PlayerId) {
        room.players.retain(|p| p.id != player_id);
        self.departures.push(player_id);
    }

    fn reset_fight_timer(&mut self, _room_id: RoomId, duration: Duration) {
        self.directives.push_back(Directive::ResetFight(duration));
    }

    fn stop_fight_timer(&mut self, _room_id: RoomId) {
        self.directives.push_back(Directive::StopFight);
    }

    fn fight_time_remaining(&self, _room_id: RoomId) -> Duration {
        self.fight_remaining
    }

    fn pause_turn_timer(&mut self, _room_id: RoomId) {
        self.directives.push_back(Directive::PauseTurn);
    }

    fn resume_turn_timer(&mut self, _room_id: RoomId) {
        self.directives.push_back(Directive::ResumeTurn);
    }

    fn schedule_combat_turn(&mut self, _room_id: RoomId, delay: Duration) {
        self.directives.push_back(Directive::ScheduleCombatTurn(delay));
    }

    fn stop_game_timers(&mut self, _room_id: RoomId) {
        self.directives.push_back(Directive::StopAll);
    }

    /// Sends to every connected player. Gone receivers are silently
    /// dropped.
    fn emit_to_room(&mut self, _room_id: RoomId, event: GameEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn emit_to_player(&mut self, player_id: PlayerId, event: GameEvent) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(event);
        }
    }

    fn reset_global_stats(&mut self, room: &mut GameRoom) {
        for player in &mut room.players {
            player.stats = MatchStats::default();
        }
    }

    /// Drops a dead player's carryable items back onto the grid: the
    /// death tile first, then outward onto the closest free tiles.
    fn place_items_on_ground(&mut self, room: &mut GameRoom, player_id: PlayerId) {
        let Some(player) = room.player(player_id) else { return };
        let origin = player.position;
        let drops: Vec<Item> = player
            .inventory
            .iter()
            .copied()
            .filter(|i| {
                matches!(i, Item::Xiphos | Item::AchillesArmor | Item::Kunee)
            })
            .collect();
        if drops.is_empty() {
            return;
        }

        for item in &drops {
            let target = if room.map.item(origin).is_none() {
                Some(origin)
            } else {
                let nav = NavigationEngine::new(&room.map, &room.players);
                nav.closest_valid_tile(origin)
            };
            if let Some(pos) = target {
                room.map.set_item(pos, Some(*item));
                debug!(
                    room_id = %room.id,
                    player = %player_id,
                    ?item,
                    x = pos.x,
                    y = pos.y,
                    "item dropped"
                );
            }
        }
        if let Some(player) = room.player_mut(player_id) {
            player.inventory.retain(|i| !drops.contains(i));
        }
    }
}
