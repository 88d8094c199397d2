//! The per-query navigation engine.

use std::collections::VecDeque;

use tilestrife_protocol::{ActionData, GameMap, Item, Player, Position, Tile};

use crate::cost::tile_cost;

/// Weighted-grid pathfinder over a room's map and player list.
///
/// Constructed per query; the `distances`/`previous` matrices are
/// transient scratch space recomputed by each expansion (Dijkstra over
/// the 4-neighborhood, matrix-scan variant). Degenerate inputs
/// (out-of-bounds positions, unknown players) yield "not reachable"
/// results; the engine never panics.
pub struct NavigationEngine<'a> {
    map: &'a GameMap,
    players: &'a [Player],
    distances: Vec<Vec<f64>>,
    previous: Vec<Vec<Option<Position>>>,
}

impl<'a> NavigationEngine<'a> {
    /// Creates an engine over a map and the room's current players.
    pub fn new(map: &'a GameMap, players: &'a [Player]) -> Self {
        let n = map.size();
        Self {
            map,
            players,
            distances: vec![vec![f64::INFINITY; n]; n],
            previous: vec![vec![None; n]; n],
        }
    }

    /// The player standing on a tile, if any.
    pub fn occupant(&self, pos: Position) -> Option<&'a Player> {
        self.players.iter().find(|p| p.position == pos)
    }

    // -----------------------------------------------------------------
    // Dijkstra expansion
    // -----------------------------------------------------------------

    /// Runs a budget-bounded expansion from `start`, filling the
    /// `distances`/`previous` matrices.
    ///
    /// Tiles occupied by another player are not entered unless
    /// `through_players` is set or the tile is the `goal` itself.
    /// Stops once the cheapest unvisited tile exceeds `budget`, or as
    /// soon as `goal` is settled.
    fn expand(
        &mut self,
        mover: &Player,
        start: Position,
        budget: f64,
        goal: Option<Position>,
        through_players: bool,
    ) {
        let n = self.map.size();
        self.distances = vec![vec![f64::INFINITY; n]; n];
        self.previous = vec![vec![None; n]; n];
        let mut visited = vec![vec![false; n]; n];

        if !self.map.in_bounds(start) {
            return;
        }
        let has_kunee = mover.has_item(Item::Kunee);
        self.distances[start.y][start.x] = 0.0;

        loop {
            // Cheapest unvisited tile (matrix scan, no float ordering
            // gymnastics needed at these grid sizes).
            let mut current: Option<(Position, f64)> = None;
            for y in 0..n {
                for x in 0..n {
                    if visited[y][x] {
                        continue;
                    }
                    let d = self.distances[y][x];
                    if d.is_finite() && current.is_none_or(|(_, best)| d < best) {
                        current = Some((Position::new(x, y), d));
                    }
                }
            }
            let Some((current, dist)) = current else { break };
            if dist > budget {
                break;
            }
            visited[current.y][current.x] = true;
            if goal == Some(current) {
                break;
            }

            for next in current.neighbors(n) {
                let Some(tile) = self.map.tile(next) else { continue };
                let Some(step) = tile_cost(tile, has_kunee) else {
                    continue;
                };
                let blocked = !through_players
                    && goal != Some(next)
                    && self
                        .occupant(next)
                        .is_some_and(|p| p.id != mover.id);
                if blocked {
                    continue;
                }
                let candidate = dist + step;
                if candidate < self.distances[next.y][next.x] {
                    self.distances[next.y][next.x] = candidate;
                    self.previous[next.y][next.x] = Some(current);
                }
            }
        }
    }

    /// Collects every tile whose settled distance is within `budget`,
    /// excluding `start`, in row-major tile order.
    fn collect_within(&self, start: Position, budget: f64) -> Vec<Position> {
        let n = self.map.size();
        let mut out = Vec::new();
        for y in 0..n {
            for x in 0..n {
                let pos = Position::new(x, y);
                if pos != start && self.distances[y][x] <= budget {
                    out.push(pos);
                }
            }
        }
        out
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Every tile the player can reach with the movement points left
    /// this turn. The player's own tile is excluded. Tiles occupied by
    /// another player only enter the set for bot movers.
    pub fn reachable_tiles(&mut self, player: &Player) -> Vec<Position> {
        let budget = f64::from(player.attributes.movement_points_left);
        self.expand(player, player.position, budget, None, player.is_bot());
        self.collect_within(player.position, budget)
    }

    /// The cheapest path from the player to `destination`, as the steps
    /// to take (origin dropped). Empty when unreachable.
    pub fn fastest_path(
        &mut self,
        player: &Player,
        destination: Position,
    ) -> Vec<Position> {
        if !self.map.in_bounds(destination) {
            return Vec::new();
        }
        self.expand(
            player,
            player.position,
            f64::INFINITY,
            Some(destination),
            player.is_bot(),
        );
        if !self.distances[destination.y][destination.x].is_finite() {
            return Vec::new();
        }
        let mut path = Vec::new();
        let mut cursor = destination;
        while cursor != player.position {
            path.push(cursor);
            match self.previous[cursor.y][cursor.x] {
                Some(prev) => cursor = prev,
                // Disconnected predecessor chain: the destination was
                // the start tile or the expansion never reached it.
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }

    /// The nearest tile around `seed` a player can safely stand on:
    /// walkable terrain, not a door, unoccupied, and item-free.
    ///
    /// The search is a breadth-first ring expansion that widens past
    /// walls and occupied tiles, so it still succeeds when every
    /// immediate neighbor is taken. The seed tile itself is never
    /// returned.
    pub fn closest_valid_tile(&self, seed: Position) -> Option<Position> {
        if !self.map.in_bounds(seed) {
            return None;
        }
        let n = self.map.size();
        let mut seen = vec![vec![false; n]; n];
        let mut queue = VecDeque::from([seed]);
        seen[seed.y][seed.x] = true;

        while let Some(current) = queue.pop_front() {
            for next in current.neighbors(n) {
                if seen[next.y][next.x] {
                    continue;
                }
                seen[next.y][next.x] = true;
                if self.is_free_standing_tile(next) {
                    return Some(next);
                }
                queue.push_back(next);
            }
        }
        None
    }

    fn is_free_standing_tile(&self, pos: Position) -> bool {
        self.map
            .tile(pos)
            .is_some_and(Tile::is_walkable_terrain)
            && self.occupant(pos).is_none()
            && self.map.item(pos).is_none()
    }

    /// The first other player standing on a tile the player could
    /// reach this turn, by tile order.
    ///
    /// Expansion runs in bot mode regardless of the player's status;
    /// occupied tiles have to enter the frontier for the intersection
    /// to ever be non-empty.
    pub fn closest_player(&mut self, player: &Player) -> Option<&'a Player> {
        let budget = f64::from(player.attributes.movement_points_left);
        self.expand(player, player.position, budget, None, true);
        self.collect_within(player.position, budget)
            .into_iter()
            .find_map(|pos| {
                self.occupant(pos).filter(|other| other.id != player.id)
            })
    }

    /// Resolves a fight click: the player (if any) standing on the
    /// clicked tile among the acting player's orthogonal neighbors.
    pub fn combat_opponent(&self, action: &ActionData) -> Option<&'a Player> {
        let actor = self.players.iter().find(|p| p.id == action.player_id)?;
        if !actor.position.is_adjacent_to(action.clicked_position) {
            return None;
        }
        self.occupant(action.clicked_position)
            .filter(|other| other.id != actor.id)
    }

    // -----------------------------------------------------------------
    // Adjacency predicates
    // -----------------------------------------------------------------

    /// The other players on tiles orthogonally adjacent to the player.
    pub fn neighbor_players(&self, player: &Player) -> Vec<&'a Player> {
        player
            .position
            .neighbors(self.map.size())
            .into_iter()
            .filter_map(|pos| self.occupant(pos))
            .filter(|other| other.id != player.id)
            .collect()
    }

    /// The door tiles orthogonally adjacent to the player.
    pub fn neighbor_doors(&self, player: &Player) -> Vec<Position> {
        player
            .position
            .neighbors(self.map.size())
            .into_iter()
            .filter(|&pos| self.map.tile(pos).is_some_and(Tile::is_door))
            .collect()
    }

    /// Whether the player could attack this turn: an action point left
    /// and an adjacent opponent.
    pub fn check_attack(&self, player: &Player) -> bool {
        player.attributes.action_points > 0
            && !self.neighbor_players(player).is_empty()
    }

    /// Whether the player could toggle a door this turn.
    pub fn check_door(&self, player: &Player) -> bool {
        player.attributes.action_points > 0
            && !self.neighbor_doors(player).is_empty()
    }

    /// Whether the player has any legal action left this turn.
    pub fn have_actions(&self, player: &Player) -> bool {
        self.check_attack(player) || self.check_door(player)
    }

    /// Placement validation for teleports and joins: the tile must be
    /// walkable terrain, unoccupied, and carry no item other than the
    /// reserved spawn marker.
    pub fn is_valid_teleport(&self, pos: Position) -> bool {
        self.map
            .tile(pos)
            .is_some_and(Tile::is_walkable_terrain)
            && self.occupant(pos).is_none()
            && matches!(self.map.item(pos), None | Some(Item::Spawn))
    }
}

// ---------------------------------------------------------------------------
// Door toggling
// ---------------------------------------------------------------------------

/// Toggles a door between its closed and open states.
///
/// Only succeeds when the tile is a door, orthogonally adjacent to the
/// player, and unoccupied; anything else is a no-op returning `false`.
/// This is the one map mutation the navigation layer performs.
pub fn toggle_door(
    map: &mut GameMap,
    players: &[Player],
    pos: Position,
    player: &Player,
) -> bool {
    if !player.position.is_adjacent_to(pos) {
        return false;
    }
    if players.iter().any(|p| p.position == pos) {
        return false;
    }
    let toggled = match map.tile(pos) {
        Some(Tile::ClosedDoor) => Tile::OpenDoor,
        Some(Tile::OpenDoor) => Tile::ClosedDoor,
        _ => return false,
    };
    map.set_tile(pos, toggled);
    tracing::debug!(player = %player.id, %pos, state = ?toggled, "door toggled");
    true
}
