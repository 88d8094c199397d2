//! Room actor: an isolated Tokio task that owns one game.
//!
//! Each room runs in its own task and communicates with the outside
//! world through an mpsc channel, so all gameplay for a room happens on
//! a single logical thread. Countdown timers live in the actor's
//! `tokio::select!` loop; the combat engine steers them through queued
//! directives drained after every engine call.

use std::time::Duration;

use tilestrife_combat::{
    CombatEngine, DiceStrategy, GameMode, GameRoom, Orchestrator,
    TracingCombatLog,
};
use tilestrife_grid::{tile_cost, toggle_door, NavigationEngine};
use tilestrife_protocol::{
    ActionData, ClientAction, GameEvent, GameMap, Item, Player, PlayerId,
    Position, RoomId,
};
use tilestrife_timer::{Countdown, CountdownEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::orchestrate::{Directive, LoopOrchestrator, PlayerSender};
use crate::RoomError;

/// Length of one movement turn.
pub const TURN_DURATION: Duration = Duration::from_secs(30);

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Add a player to the room.
    Join {
        player: Player,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Deliver a gameplay action from a player.
    Action {
        player_id: PlayerId,
        action: ClientAction,
    },

    /// The player's connection dropped for good.
    Disconnect { player_id: PlayerId },

    /// Request room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Request a snapshot of one player.
    GetPlayer {
        player_id: PlayerId,
        reply: oneshot::Sender<Option<Player>>,
    },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's unique ID.
    pub room_id: RoomId,
    /// Number of players currently in the room, bots included.
    pub player_count: usize,
    /// Whether a fight is running right now.
    pub fight_running: bool,
    /// The player whose movement turn is running, if any.
    pub active_player: Option<PlayerId>,
    /// Whether the game has concluded.
    pub finished: bool,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's unique ID.
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Sends a join request and waits for the room's verdict.
    pub async fn join(
        &self,
        player: Player,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                player,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Sends a gameplay action (fire-and-forget).
    pub async fn action(
        &self,
        player_id: PlayerId,
        action: ClientAction,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action { player_id, action })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Reports a dropped connection.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnect { player_id })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Requests current room metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Requests a snapshot of one player.
    pub async fn player(
        &self,
        player_id: PlayerId,
    ) -> Result<Option<Player>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetPlayer {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// What woke the actor loop.
enum Wake {
    Command(Option<RoomCommand>),
    TurnTimer(CountdownEvent),
    FightTimer(CountdownEvent),
    CombatTurnDue,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<D> {
    room: GameRoom,
    engine: CombatEngine<LoopOrchestrator, TracingCombatLog, D>,
    turn_timer: Countdown,
    fight_timer: Countdown,
    /// Deadline of a pending combat-turn start, if one is scheduled.
    combat_turn_at: Option<Instant>,
    receiver: mpsc::Receiver<RoomCommand>,
    finished: bool,
}

impl<D: DiceStrategy> RoomActor<D> {
    async fn run(mut self) {
        info!(room_id = %self.room.id, "room actor started");

        loop {
            let combat_turn_at = self.combat_turn_at;
            let wake = tokio::select! {
                cmd = self.receiver.recv() => Wake::Command(cmd),
                ev = self.turn_timer.next_event() => Wake::TurnTimer(ev),
                ev = self.fight_timer.next_event() => Wake::FightTimer(ev),
                () = async {
                    match combat_turn_at {
                        Some(at) => time::sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => Wake::CombatTurnDue,
            };

            match wake {
                Wake::Command(None) => break,
                Wake::Command(Some(cmd)) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Wake::TurnTimer(ev) => self.on_turn_timer(ev),
                Wake::FightTimer(ev) => self.on_fight_timer(ev),
                Wake::CombatTurnDue => {
                    self.combat_turn_at = None;
                    self.sync_timers();
                    self.engine.on_start_turn(&mut self.room);
                    self.settle();
                }
            }
        }

        info!(room_id = %self.room.id, "room actor stopped");
    }

    /// Returns `true` when the actor should shut down.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                player,
                sender,
                reply,
            } => {
                let result = self.handle_join(player, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Action { player_id, action } => {
                self.handle_action(player_id, action);
            }
            RoomCommand::Disconnect { player_id } => {
                self.handle_disconnect(player_id);
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::GetPlayer { player_id, reply } => {
                let _ = reply.send(self.room.player(player_id).cloned());
            }
            RoomCommand::Shutdown => {
                info!(room_id = %self.room.id, "room shutting down");
                return true;
            }
        }
        false
    }

    fn handle_join(
        &mut self,
        player: Player,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.room.player(player.id).is_some() {
            return Err(RoomError::AlreadyInRoom(player.id, self.room.id));
        }
        {
            let nav = NavigationEngine::new(&self.room.map, &self.room.players);
            if !nav.is_valid_teleport(player.position) {
                return Err(RoomError::InvalidPlacement(
                    player.position.x,
                    player.position.y,
                ));
            }
        }

        let player_id = player.id;
        self.engine.orchestrator_mut().insert_sender(player_id, sender);
        self.room.players.push(player);
        info!(
            room_id = %self.room.id,
            %player_id,
            players = self.room.players.len(),
            "player joined"
        );

        // Late joiners catch up on a running fight.
        if self.engine.store().contains(self.room.id) {
            self.sync_timers();
            self.engine.sync_with_combat(&self.room, player_id);
        }

        if self.room.active_player.is_none()
            && !self.finished
            && self.room.active_participants() >= 2
        {
            self.advance_turn();
        }

        Ok(())
    }

    fn handle_action(&mut self, player_id: PlayerId, action: ClientAction) {
        if self.room.player(player_id).is_none() {
            warn!(
                room_id = %self.room.id,
                %player_id,
                "action from non-member, ignoring"
            );
            return;
        }

        match action {
            ClientAction::FightAction { clicked_position } => {
                self.handle_fight_action(player_id, clicked_position);
            }
            ClientAction::Attack => {
                if self.holds_combat_turn(player_id) {
                    self.sync_timers();
                    self.engine.attack_player(&mut self.room);
                    self.settle();
                }
            }
            ClientAction::Evade => {
                if self.holds_combat_turn(player_id) {
                    self.sync_timers();
                    self.engine.evading_player(&mut self.room);
                    self.settle();
                }
            }
            ClientAction::RequestReachableTiles => {
                self.handle_reachable_tiles(player_id);
            }
            ClientAction::ToggleDoor { position } => {
                self.handle_toggle_door(player_id, position);
            }
            ClientAction::Move { destination } => {
                self.handle_move(player_id, destination);
            }
            ClientAction::SyncCombat => {
                self.sync_timers();
                if self.engine.store().contains(self.room.id) {
                    self.engine.sync_with_combat(&self.room, player_id);
                } else {
                    self.engine
                        .orchestrator_mut()
                        .emit_to_player(player_id, GameEvent::CombatOver);
                }
            }
            ClientAction::Leave => {
                self.handle_disconnect(player_id);
            }
        }
    }

    fn handle_fight_action(&mut self, player_id: PlayerId, clicked: Position) {
        if self.room.active_player != Some(player_id) {
            debug!(room_id = %self.room.id, %player_id, "fight click outside own turn");
            return;
        }
        if self
            .room
            .player(player_id)
            .is_none_or(|p| p.attributes.action_points == 0)
        {
            return;
        }
        self.sync_timers();
        self.engine.start_fight(
            &mut self.room,
            &ActionData {
                clicked_position: clicked,
                player_id,
            },
        );
        // The action point is spent only if a fight actually started.
        if self.engine.store().is_in_combat(self.room.id, player_id) {
            if let Some(p) = self.room.player_mut(player_id) {
                p.attributes.action_points =
                    p.attributes.action_points.saturating_sub(1);
            }
        }
        self.settle();
    }

    fn handle_reachable_tiles(&mut self, player_id: PlayerId) {
        let tiles = {
            let Some(player) = self.room.player(player_id) else { return };
            let mut nav =
                NavigationEngine::new(&self.room.map, &self.room.players);
            nav.reachable_tiles(player)
        };
        self.engine
            .orchestrator_mut()
            .emit_to_player(player_id, GameEvent::ReachableTiles(tiles));
    }

    fn handle_toggle_door(&mut self, player_id: PlayerId, position: Position) {
        if self.room.active_player != Some(player_id) {
            return;
        }
        let Some(idx) = self.room.players.iter().position(|p| p.id == player_id)
        else {
            return;
        };
        if self.room.players[idx].attributes.action_points == 0 {
            return;
        }
        let toggled = toggle_door(
            &mut self.room.map,
            &self.room.players,
            position,
            &self.room.players[idx],
        );
        if toggled {
            let p = &mut self.room.players[idx];
            p.attributes.action_points = p.attributes.action_points.saturating_sub(1);
        }
    }

    fn handle_move(&mut self, player_id: PlayerId, destination: Position) {
        if self.room.active_player != Some(player_id) {
            return;
        }
        if self.engine.store().is_in_combat(self.room.id, player_id) {
            return;
        }

        let (path, start, has_kunee, mut budget) = {
            let Some(player) = self.room.player(player_id) else { return };
            let mut nav =
                NavigationEngine::new(&self.room.map, &self.room.players);
            if nav.occupant(destination).is_some() {
                return;
            }
            let path = nav.fastest_path(player, destination);
            (
                path,
                player.position,
                player.has_item(Item::Kunee),
                f64::from(player.attributes.movement_points_left),
            )
        };
        if path.is_empty() {
            return;
        }

        // Walk the path as far as the movement budget allows.
        let mut stopped_at = start;
        for step in path {
            let Some(cost) = self
                .room
                .map
                .tile(step)
                .and_then(|t| tile_cost(t, has_kunee))
            else {
                break;
            };
            if cost > budget {
                break;
            }
            budget -= cost;
            stopped_at = step;
        }
        if stopped_at == start {
            return;
        }

        // Carryable items on the final tile are picked up.
        let picked_up = match self.room.map.item(stopped_at) {
            Some(item @ (Item::Xiphos | Item::AchillesArmor | Item::Kunee)) => {
                self.room.map.set_item(stopped_at, None);
                Some(item)
            }
            _ => None,
        };

        if let Some(p) = self.room.player_mut(player_id) {
            p.position = stopped_at;
            p.attributes.movement_points_left = budget.floor() as u32;
            if let Some(item) = picked_up {
                p.inventory.push(item);
            }
        }
        debug!(
            room_id = %self.room.id,
            %player_id,
            x = stopped_at.x,
            y = stopped_at.y,
            "player moved"
        );
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) {
        if self.room.player(player_id).is_none() {
            return;
        }
        self.sync_timers();
        self.engine
            .handle_disconnected_player(&mut self.room, player_id);
        self.settle();
    }

    fn on_turn_timer(&mut self, ev: CountdownEvent) {
        match ev {
            CountdownEvent::Tick(_) => {}
            CountdownEvent::Finished => {
                debug!(room_id = %self.room.id, "movement turn expired");
                self.advance_turn();
            }
        }
    }

    fn on_fight_timer(&mut self, ev: CountdownEvent) {
        self.sync_timers();
        match ev {
            CountdownEvent::Tick(seconds) => {
                self.engine.on_fight_tick(&self.room, seconds);
            }
            CountdownEvent::Finished => {
                self.engine.on_fight_timeout(&mut self.room);
            }
        }
        self.settle();
    }

    /// Whether the player holds the current combat turn.
    fn holds_combat_turn(&self, player_id: PlayerId) -> bool {
        self.engine
            .store()
            .get(self.room.id)
            .is_some_and(|rec| rec.attacker == player_id)
    }

    /// Mirrors the live fight-timer remainder into the orchestrator
    /// before an engine call reads it.
    fn sync_timers(&mut self) {
        let fight = self.fight_timer.remaining();
        self.engine.orchestrator_mut().set_remaining(fight);
    }

    /// Drains everything the engine queued on the orchestrator: timer
    /// directives, departures, turn handoff, game over.
    fn settle(&mut self) {
        while let Some(directive) = self.engine.orchestrator_mut().next_directive()
        {
            match directive {
                Directive::ResetFight(duration) => {
                    self.fight_timer.reset(duration);
                }
                Directive::StopFight => self.fight_timer.stop(),
                Directive::PauseTurn => self.turn_timer.pause(),
                Directive::ResumeTurn => self.turn_timer.resume(),
                Directive::ScheduleCombatTurn(delay) => {
                    self.combat_turn_at = Some(Instant::now() + delay);
                }
                Directive::StopAll => {
                    self.fight_timer.stop();
                    self.turn_timer.stop();
                    self.combat_turn_at = None;
                }
            }
        }

        if let Some(winner) = self.engine.orchestrator_mut().take_game_over() {
            self.finished = true;
            self.room.active_player = None;
            info!(room_id = %self.room.id, %winner, "game concluded");
        }

        let mut need_advance = self.engine.orchestrator_mut().take_turn_ended();
        for player_id in self.engine.orchestrator_mut().take_departures() {
            self.engine.orchestrator_mut().remove_sender(player_id);
            if self.room.active_player == Some(player_id) {
                need_advance = true;
            }
        }
        if need_advance {
            self.advance_turn();
        }
    }

    /// Hands the movement turn to the next active player, ordered by
    /// descending speed (roster order breaks ties), and refreshes their
    /// movement and action points.
    ///
    /// With fewer than two active participants there is no game to
    /// rotate: the turn clears and the clock stays stopped.
    fn advance_turn(&mut self) {
        if self.finished {
            return;
        }
        let mut order: Vec<(u32, PlayerId)> = self
            .room
            .players
            .iter()
            .filter(|p| p.is_active())
            .map(|p| (p.attributes.speed, p.id))
            .collect();
        if order.len() < 2 {
            self.room.active_player = None;
            self.turn_timer.stop();
            return;
        }
        order.sort_by(|a, b| b.0.cmp(&a.0));
        let ids: Vec<PlayerId> = order.into_iter().map(|(_, id)| id).collect();

        let next = match self
            .room
            .active_player
            .and_then(|current| ids.iter().position(|&id| id == current))
        {
            Some(i) => ids[(i + 1) % ids.len()],
            None => ids[0],
        };
        self.room.active_player = Some(next);
        if let Some(p) = self.room.player_mut(next) {
            p.attributes.movement_points_left = p.attributes.speed;
            p.attributes.action_points = 1;
        }
        self.turn_timer.reset(TURN_DURATION);
        debug!(room_id = %self.room.id, player = %next, "movement turn started");
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room.id,
            player_count: self.room.players.len(),
            fight_running: self.engine.store().contains(self.room.id),
            active_player: self.room.active_player,
            finished: self.finished,
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
pub(crate) fn spawn_room<D>(
    room_id: RoomId,
    map: GameMap,
    mode: GameMode,
    dice: D,
    channel_size: usize,
) -> RoomHandle
where
    D: DiceStrategy + 'static,
{
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        room: GameRoom::new(room_id, map, Vec::new(), mode),
        engine: CombatEngine::new(LoopOrchestrator::new(), TracingCombatLog, dice),
        turn_timer: Countdown::new("turn"),
        fight_timer: Countdown::new("fight"),
        combat_turn_at: None,
        receiver: rx,
        finished: false,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
