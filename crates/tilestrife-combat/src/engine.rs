//! The combat engine: one guarded state machine per room.

use std::time::Duration;

use tilestrife_grid::NavigationEngine;
use tilestrife_protocol::{
    ActionData, Behavior, CombatPlayers, GameEvent, Item, Player, PlayerId,
    PlayerStatus, RollResult, Tile,
};
use tracing::{debug, info, warn};

use crate::{
    CombatLog, CombatRecord, CombatStore, DiceStrategy, GameMode, GameRoom,
    Orchestrator,
};

// ---------------------------------------------------------------------------
// Combat rules
// ---------------------------------------------------------------------------

/// Fight-turn duration while the turn holder can still try to evade.
pub const FIGHT_TURN_DURATION: Duration = Duration::from_secs(5);
/// Fight-turn duration once the turn holder has no evasion attempts
/// left.
pub const FIGHT_TURN_NO_EVASION: Duration = Duration::from_secs(3);
/// Fight-turn duration when both participants are bots.
pub const FIGHT_TURN_BOTH_BOTS: Duration = Duration::from_secs(1);
/// Delay between an attack resolution and the next combat turn, so the
/// client-side roll animation can finish.
pub const NEXT_COMBAT_TURN_DELAY: Duration = Duration::from_secs(1);
/// An evasion draw strictly below this succeeds.
pub const EVASION_THRESHOLD: f64 = 0.4;
/// Evasion attempts granted to each participant at fight start.
pub const EVASION_ATTEMPTS: u8 = 2;
/// Damage applied by a successful attack (and by Achilles Armor
/// self-damage).
pub const COMBAT_DAMAGE: u32 = 1;
/// Attack/defense decrement for fighting from an ice tile.
pub const ICE_PENALTY: i32 = 2;
/// Attack bonus for a wounded Xiphos holder.
pub const XIPHOS_ATTACK_BONUS: i32 = 2;
/// Defense penalty on the Xiphos holder's opponent.
pub const XIPHOS_DEFENSE_PENALTY: i32 = 1;
/// Victories needed to win a Classic-mode game.
pub const CLASSIC_WIN_THRESHOLD: u32 = 3;

/// Clones the two participants into a wire snapshot, first turn-holder
/// as `attacker`.
fn snapshot(
    room: &GameRoom,
    attacker: PlayerId,
    defender: PlayerId,
) -> Option<CombatPlayers> {
    Some(CombatPlayers {
        attacker: room.player(attacker)?.clone(),
        defender: room.player(defender)?.clone(),
    })
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The per-room combat state machine.
///
/// Owns the [`CombatStore`] (at most one fight per room) and the
/// injected collaborators. Every public method is an entry point driven
/// by a socket event or a timer callback, and every one of them first
/// re-validates the room's combat record; a stale callback acting on a
/// finished fight does nothing observable.
pub struct CombatEngine<O, L, D> {
    store: CombatStore,
    orchestrator: O,
    log: L,
    dice: D,
}

impl<O: Orchestrator, L: CombatLog, D: DiceStrategy> CombatEngine<O, L, D> {
    /// Creates an engine with no fights running.
    pub fn new(orchestrator: O, log: L, dice: D) -> Self {
        Self {
            store: CombatStore::new(),
            orchestrator,
            log,
            dice,
        }
    }

    /// The room-keyed fight store (read-only).
    pub fn store(&self) -> &CombatStore {
        &self.store
    }

    /// The injected orchestrator.
    pub fn orchestrator(&self) -> &O {
        &self.orchestrator
    }

    /// The injected orchestrator, mutably. The room runtime uses this
    /// to drain queued timer directives after each engine call.
    pub fn orchestrator_mut(&mut self) -> &mut O {
        &mut self.orchestrator
    }

    // -----------------------------------------------------------------
    // Fight lifecycle
    // -----------------------------------------------------------------

    /// Starts a fight from a grid click, if the click resolves to an
    /// adjacent opponent and the room has no fight running.
    pub fn start_fight(&mut self, room: &mut GameRoom, action: &ActionData) {
        if self.store.contains(room.id) {
            warn!(room_id = %room.id, "fight requested while one is already running");
            return;
        }
        let initiator_id = action.player_id;
        let Some(opponent_id) = ({
            let nav = NavigationEngine::new(&room.map, &room.players);
            nav.combat_opponent(action).map(|p| p.id)
        }) else {
            debug!(
                room_id = %room.id,
                player = %initiator_id,
                "fight click resolved to no opponent"
            );
            return;
        };
        let Some(initiator_speed) =
            room.player(initiator_id).map(|p| p.attributes.speed)
        else {
            return;
        };
        let Some(opponent_speed) =
            room.player(opponent_id).map(|p| p.attributes.speed)
        else {
            return;
        };

        // Higher speed opens the fight; ties favor the initiator.
        let (first, second) = if opponent_speed > initiator_speed {
            (opponent_id, initiator_id)
        } else {
            (initiator_id, opponent_id)
        };

        let mut record = CombatRecord::new(room.id, first, second);

        for pid in [initiator_id, opponent_id] {
            let on_ice = room
                .player(pid)
                .and_then(|p| room.map.tile(p.position))
                == Some(Tile::Ice);
            if let Some(p) = room.player_mut(pid) {
                p.attributes.evasions_left = EVASION_ATTEMPTS;
                p.stats.combats += 1;
                if on_ice {
                    p.attributes.attack -= ICE_PENALTY;
                    p.attributes.defense -= ICE_PENALTY;
                    record.ice_penalized.push(pid);
                }
            }
        }

        let Some(combat_players) = snapshot(room, first, second) else {
            return;
        };
        let is_active_player_attacker =
            self.orchestrator.active_player(room) == Some(first);

        self.orchestrator.pause_turn_timer(room.id);
        info!(room_id = %room.id, attacker = %first, defender = %second, "fight started");
        if let (Some(a), Some(b)) = (room.player(first), room.player(second)) {
            self.log.send_global_combat_log(room.id, a, b, "fight started");
        }
        self.orchestrator.emit_to_room(
            room.id,
            GameEvent::StartFight {
                combat_players,
                is_active_player_attacker,
            },
        );
        let _ = self.store.insert(record);
        self.on_start_turn(room);
    }

    /// Opens a combat turn: re-evaluates item effects, lets a damaged
    /// defensive bot auto-evade, and otherwise arms the fight timer
    /// with the three-tier duration policy.
    pub fn on_start_turn(&mut self, room: &mut GameRoom) {
        let Some(rec) = self.store.get_mut(room.id) else { return };
        rec.fail_evasion = false;
        let (current_id, other_id) = (rec.attacker, rec.defender);

        self.refresh_xiphos(room);

        let (auto_evade, both_bots, out_of_evasions) = {
            let Some(current) = room.player(current_id) else { return };
            (
                current.is_bot()
                    && current.behavior == Behavior::Defensive
                    && current.is_damaged()
                    && current.attributes.evasions_left > 0,
                current.is_bot()
                    && room.player(other_id).is_some_and(Player::is_bot),
                current.attributes.evasions_left == 0,
            )
        };

        if auto_evade {
            debug!(room_id = %room.id, player = %current_id, "defensive bot auto-evades");
            self.evading_player(room);
            return;
        }

        let duration = if both_bots {
            FIGHT_TURN_BOTH_BOTS
        } else if out_of_evasions {
            FIGHT_TURN_NO_EVASION
        } else {
            FIGHT_TURN_DURATION
        };
        self.orchestrator.reset_fight_timer(room.id, duration);
    }

    /// Rolls an attack for the current turn holder. Strictly greater
    /// attack total wins; ties fail.
    pub fn attack_player(&mut self, room: &mut GameRoom) {
        let Some(rec) = self.store.get(room.id) else { return };
        let (attacker_id, defender_id) = (rec.attacker, rec.defender);

        let Some((attack_base, attack_dice, has_achilles)) =
            room.player(attacker_id).map(|p| {
                (
                    p.attributes.attack,
                    p.attributes.attack_dice,
                    p.has_item(Item::AchillesArmor),
                )
            })
        else {
            return;
        };
        let Some((defense_base, defense_dice)) = room
            .player(defender_id)
            .map(|p| (p.attributes.defense, p.attributes.defense_dice))
        else {
            return;
        };

        let attack_values =
            RollResult::new(attack_base, self.dice.attack_roll(attack_dice));
        let defense_values =
            RollResult::new(defense_base, self.dice.defense_roll(defense_dice));

        if let (Some(a), Some(d)) =
            (room.player(attacker_id), room.player(defender_id))
        {
            self.log.send_combat_action_log(
                room.id,
                a,
                d,
                &attack_values,
                &defense_values,
            );
        }
        self.orchestrator.emit_to_room(
            room.id,
            GameEvent::AttackValues {
                attack_values,
                defense_values,
            },
        );

        if attack_values.total > defense_values.total {
            if let Some(d) = room.player_mut(defender_id) {
                d.attributes.current_hp =
                    d.attributes.current_hp.saturating_sub(COMBAT_DAMAGE);
                d.stats.damage_taken += COMBAT_DAMAGE;
            }
            if let Some(a) = room.player_mut(attacker_id) {
                a.stats.damage_dealt += COMBAT_DAMAGE;
            }
            self.orchestrator.emit_to_room(
                room.id,
                GameEvent::AttackSuccess {
                    attacker: attacker_id,
                    damage: COMBAT_DAMAGE,
                },
            );
            if let Some(a) = room.player(attacker_id) {
                self.log.send_combat_result_log(room.id, a, "attack landed");
            }
        } else {
            if has_achilles {
                if let Some(a) = room.player_mut(attacker_id) {
                    a.attributes.current_hp =
                        a.attributes.current_hp.saturating_sub(COMBAT_DAMAGE);
                    a.stats.damage_taken += COMBAT_DAMAGE;
                }
            }
            self.orchestrator.emit_to_room(
                room.id,
                GameEvent::AttackFail {
                    attacker: attacker_id,
                    should_damage_self: has_achilles,
                    damage: if has_achilles { COMBAT_DAMAGE } else { 0 },
                },
            );
            if let Some(a) = room.player(attacker_id) {
                self.log.send_combat_result_log(room.id, a, "attack failed");
            }
        }

        self.check_combat_outcome(room);
    }

    /// Attempts an evasion for the current turn holder.
    pub fn evading_player(&mut self, room: &mut GameRoom) {
        let Some(rec) = self.store.get(room.id) else { return };
        let evader_id = rec.attacker;
        let Some(evasions_left) = room
            .player(evader_id)
            .map(|p| p.attributes.evasions_left)
        else {
            return;
        };
        if evasions_left == 0 {
            return;
        }

        if self.dice.evasion_draw() < EVASION_THRESHOLD {
            if let Some(p) = room.player_mut(evader_id) {
                p.stats.evasions += 1;
            }
            info!(room_id = %room.id, player = %evader_id, "evasion succeeded");
            self.end_combat(room);
            self.orchestrator.resume_turn_timer(room.id);
            if let Some(evader) = room.player(evader_id) {
                self.log
                    .send_combat_result_log(room.id, evader, "evasion succeeded");
                let event = GameEvent::EvasionSuccess {
                    list_players: room.players.clone(),
                    player: evader.clone(),
                };
                self.orchestrator.emit_to_room(room.id, event);
            }
        } else {
            if let Some(p) = room.player_mut(evader_id) {
                p.attributes.evasions_left -= 1;
            }
            if let Some(evader) = room.player(evader_id) {
                self.log
                    .send_combat_result_log(room.id, evader, "evasion failed");
                self.orchestrator
                    .emit_to_room(room.id, GameEvent::EvasionFail(evader.clone()));
            }
            self.end_combat_turn(room, true);
        }
    }

    /// Respawns the loser, credits the fight, ends the combat record,
    /// and either concludes the game or hands control back to the turn
    /// system.
    pub fn manage_player_death(
        &mut self,
        room: &mut GameRoom,
        winner_id: PlayerId,
        loser_id: PlayerId,
    ) {
        let Some(old_position) = room.player(loser_id).map(|p| p.position)
        else {
            return;
        };
        if let Some(w) = room.player_mut(winner_id) {
            w.stats.victories += 1;
        }
        if let Some(l) = room.player_mut(loser_id) {
            l.stats.defeats += 1;
        }

        self.orchestrator.place_items_on_ground(room, loser_id);

        let Some(spawn) = room.player(loser_id).map(|p| p.spawn_position)
        else {
            return;
        };
        let spawn_taken = room
            .players
            .iter()
            .any(|p| p.id != loser_id && p.position == spawn);
        let respawn = if spawn_taken {
            let nav = NavigationEngine::new(&room.map, &room.players);
            nav.closest_valid_tile(spawn).unwrap_or(old_position)
        } else {
            spawn
        };
        if let Some(l) = room.player_mut(loser_id) {
            l.position = respawn;
            l.attributes.current_hp = l.attributes.total_hp;
        }
        if let Some(l) = room.player(loser_id) {
            let event = GameEvent::RespawnPlayer {
                old_position,
                player_to_replace: l.clone(),
            };
            self.orchestrator.emit_to_room(room.id, event);
        }

        self.end_combat(room);
        info!(room_id = %room.id, winner = %winner_id, loser = %loser_id, "fight concluded");
        if let Some(w) = room.player(winner_id) {
            let event = GameEvent::CombatEnd {
                list_players: room.players.clone(),
                player: w.clone(),
            };
            self.orchestrator.emit_to_room(room.id, event);
        }
        self.conclude_or_continue(room, winner_id);
    }

    // -----------------------------------------------------------------
    // Disconnection
    // -----------------------------------------------------------------

    /// A player's connection dropped for good: mark them, settle any
    /// fight they were in, and hand them to the orchestrator.
    pub fn handle_disconnected_player(
        &mut self,
        room: &mut GameRoom,
        player_id: PlayerId,
    ) {
        let Some(p) = room.player_mut(player_id) else { return };
        if p.status == PlayerStatus::Disconnected {
            return;
        }
        p.status = PlayerStatus::Disconnected;
        info!(room_id = %room.id, player = %player_id, "player disconnected");
        if let Some(p) = room.player(player_id) {
            self.log.send_player_log(room.id, p, "disconnected");
        }

        if self.store.is_in_combat(room.id, player_id) {
            self.manage_combat_player_disconnection(room, player_id);
        } else if room.active_participants() < 2 {
            self.orchestrator.stop_game_timers(room.id);
        }
        self.orchestrator.leave_player_from_game(room, player_id);
    }

    /// Settles a fight whose participant disconnected: the survivor is
    /// awarded a default win with no further dice rolls.
    pub fn manage_combat_player_disconnection(
        &mut self,
        room: &mut GameRoom,
        player_id: PlayerId,
    ) {
        let Some(rec) = self.store.get(room.id) else { return };
        let Some(survivor_id) = rec.opponent_of(player_id) else { return };

        self.end_combat(room);
        if let Some(s) = room.player_mut(survivor_id) {
            s.stats.victories += 1;
        }
        self.orchestrator
            .emit_to_player(survivor_id, GameEvent::DefaultCombatWin);
        info!(room_id = %room.id, survivor = %survivor_id, "default combat win");
        if let Some(s) = room.player(survivor_id) {
            self.log.send_combat_result_log(
                room.id,
                s,
                "default win on opponent disconnect",
            );
        }

        if room.active_participants() < 2 {
            self.orchestrator.stop_game_timers(room.id);
            return;
        }
        self.conclude_or_continue(room, survivor_id);
    }

    // -----------------------------------------------------------------
    // Timer entry points
    // -----------------------------------------------------------------

    /// A fight-timer tick. Broadcasts the remaining time, unless the
    /// fight is already over (stale callback).
    pub fn on_fight_tick(&mut self, room: &GameRoom, seconds_remaining: u64) {
        if !self.store.contains(room.id) {
            return;
        }
        self.orchestrator
            .emit_to_room(room.id, GameEvent::CombatTime(seconds_remaining));
    }

    /// The fight timer expired: the turn holder acts automatically.
    pub fn on_fight_timeout(&mut self, room: &mut GameRoom) {
        let Some(rec) = self.store.get(room.id) else { return };
        debug!(room_id = %room.id, player = %rec.attacker, "fight timer expired, auto attack");
        self.attack_player(room);
    }

    // -----------------------------------------------------------------
    // Catch-up
    // -----------------------------------------------------------------

    /// Replays the current fight to a client joining or reconnecting
    /// mid-combat: a state snapshot, not a transition. No-op when no
    /// fight is running.
    pub fn sync_with_combat(&mut self, room: &GameRoom, player_id: PlayerId) {
        let Some(rec) = self.store.get(room.id) else { return };
        let (attacker_id, defender_id) = (rec.attacker, rec.defender);
        let Some(combat_players) = snapshot(room, attacker_id, defender_id)
        else {
            return;
        };
        let is_active_player_attacker =
            self.orchestrator.active_player(room) == Some(attacker_id);
        let remaining = self.orchestrator.fight_time_remaining(room.id);

        self.orchestrator.emit_to_player(
            player_id,
            GameEvent::StartFight {
                combat_players,
                is_active_player_attacker,
            },
        );
        self.orchestrator
            .emit_to_player(player_id, GameEvent::CombatInProgress);
        self.orchestrator
            .emit_to_player(player_id, GameEvent::CombatTime(remaining.as_secs()));
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// Applies or removes the Xiphos effect for both participants
    /// according to the below-half-health condition.
    fn refresh_xiphos(&mut self, room: &mut GameRoom) {
        let Some(rec) = self.store.get(room.id) else { return };
        let pairs = [(rec.attacker, rec.defender), (rec.defender, rec.attacker)];
        let active = rec.xiphos_holders.clone();

        let mut to_apply = Vec::new();
        let mut to_remove = Vec::new();
        for (holder_id, opponent_id) in pairs {
            let Some(holder) = room.player(holder_id) else { continue };
            if !holder.has_item(Item::Xiphos) {
                continue;
            }
            let wounded = holder.attributes.current_hp * 2
                < holder.attributes.total_hp;
            let applied = active.contains(&holder_id);
            if wounded && !applied {
                to_apply.push((holder_id, opponent_id));
            } else if !wounded && applied {
                to_remove.push((holder_id, opponent_id));
            }
        }

        for (holder_id, opponent_id) in to_apply {
            if let Some(p) = room.player_mut(holder_id) {
                p.attributes.attack += XIPHOS_ATTACK_BONUS;
            }
            if let Some(p) = room.player_mut(opponent_id) {
                p.attributes.defense -= XIPHOS_DEFENSE_PENALTY;
            }
            if let Some(rec) = self.store.get_mut(room.id) {
                rec.xiphos_holders.push(holder_id);
            }
            debug!(room_id = %room.id, holder = %holder_id, "xiphos effect applied");
        }
        for (holder_id, opponent_id) in to_remove {
            if let Some(p) = room.player_mut(holder_id) {
                p.attributes.attack -= XIPHOS_ATTACK_BONUS;
            }
            if let Some(p) = room.player_mut(opponent_id) {
                p.attributes.defense += XIPHOS_DEFENSE_PENALTY;
            }
            if let Some(rec) = self.store.get_mut(room.id) {
                rec.xiphos_holders.retain(|&h| h != holder_id);
            }
            debug!(room_id = %room.id, holder = %holder_id, "xiphos effect removed");
        }
    }

    /// After an attack resolution: a death ends the fight, otherwise
    /// the turn passes.
    fn check_combat_outcome(&mut self, room: &mut GameRoom) {
        let Some(rec) = self.store.get(room.id) else { return };
        let (attacker_id, defender_id) = (rec.attacker, rec.defender);
        let hp =
            |room: &GameRoom, id| room.player(id).map(|p| p.attributes.current_hp);

        match (hp(room, attacker_id), hp(room, defender_id)) {
            (Some(_), Some(0)) => {
                self.manage_player_death(room, attacker_id, defender_id);
            }
            // Achilles Armor can take the attacker down instead.
            (Some(0), Some(_)) => {
                self.manage_player_death(room, defender_id, attacker_id);
            }
            (Some(_), Some(_)) => self.end_combat_turn(room, false),
            _ => {}
        }
    }

    /// Hands the combat turn to the other participant and schedules the
    /// next turn start.
    fn end_combat_turn(&mut self, room: &mut GameRoom, fail_evasion: bool) {
        let Some(rec) = self.store.get_mut(room.id) else { return };
        rec.swap_turn();
        rec.fail_evasion = fail_evasion;
        let (attacker_id, defender_id) = (rec.attacker, rec.defender);

        let Some(combat_players) = snapshot(room, attacker_id, defender_id)
        else {
            return;
        };
        self.orchestrator.emit_to_room(
            room.id,
            GameEvent::CombatTurnEnded {
                combat_players,
                fail_evasion,
            },
        );
        self.orchestrator
            .schedule_combat_turn(room.id, NEXT_COMBAT_TURN_DELAY);
    }

    /// Removes the room's fight record, reverting everything the fight
    /// applied to the players, and disarms the fight timer.
    fn end_combat(&mut self, room: &mut GameRoom) -> Option<CombatRecord> {
        let rec = self.store.remove(room.id)?;
        for &pid in &rec.ice_penalized {
            if let Some(p) = room.player_mut(pid) {
                p.attributes.attack += ICE_PENALTY;
                p.attributes.defense += ICE_PENALTY;
            }
        }
        for &holder_id in &rec.xiphos_holders {
            if let Some(p) = room.player_mut(holder_id) {
                p.attributes.attack -= XIPHOS_ATTACK_BONUS;
            }
            if let Some(opponent_id) = rec.opponent_of(holder_id) {
                if let Some(p) = room.player_mut(opponent_id) {
                    p.attributes.defense += XIPHOS_DEFENSE_PENALTY;
                }
            }
        }
        self.orchestrator.stop_fight_timer(room.id);
        debug!(room_id = %room.id, "combat record cleared");
        Some(rec)
    }

    /// Ends the game if the winner crossed the Classic threshold,
    /// otherwise returns control to the movement turn system.
    fn conclude_or_continue(&mut self, room: &mut GameRoom, winner_id: PlayerId) {
        let victories =
            room.player(winner_id).map_or(0, |p| p.stats.victories);
        if room.mode == GameMode::Classic && victories >= CLASSIC_WIN_THRESHOLD {
            info!(room_id = %room.id, winner = %winner_id, "classic win threshold reached");
            if let Some(w) = room.player(winner_id) {
                self.log.send_end_game_log(room.id, w);
            }
            self.orchestrator.stop_game_timers(room.id);
            self.orchestrator.on_end_game(room, winner_id);
            self.orchestrator.reset_global_stats(room);
            return;
        }
        if self.orchestrator.active_player(room) == Some(winner_id) {
            self.orchestrator.resume_turn_timer(room.id);
        } else {
            self.orchestrator.on_turn_ended(room);
        }
    }
}
