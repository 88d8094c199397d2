//! Integration tests for the navigation engine.

use tilestrife_grid::{toggle_door, NavigationEngine};
use tilestrife_protocol::{
    ActionData, GameMap, Item, Player, PlayerId, Position, PlayerStatus, Tile,
};

// =========================================================================
// Helpers
// =========================================================================

use Tile::{ClosedDoor, Ground, OpenDoor, Wall, Water};

fn map_3x3() -> GameMap {
    // [[G, G, G],
    //  [W, #, G],
    //  [G, G, G]]
    GameMap::from_terrain(vec![
        vec![Ground, Ground, Ground],
        vec![Water, Wall, Ground],
        vec![Ground, Ground, Ground],
    ])
    .unwrap()
}

fn open_map(size: usize) -> GameMap {
    GameMap::from_terrain(vec![vec![Ground; size]; size]).unwrap()
}

fn player_at(id: u64, x: usize, y: usize) -> Player {
    Player::new(PlayerId(id), format!("p{id}"), Position::new(x, y))
}

fn bot_at(id: u64, x: usize, y: usize) -> Player {
    let mut p = player_at(id, x, y);
    p.status = PlayerStatus::Bot;
    p
}

// =========================================================================
// Reachable tiles
// =========================================================================

#[test]
fn test_reachable_tiles_scenario_3x3() {
    let map = map_3x3();
    let mut mover = player_at(1, 0, 0);
    mover.attributes.movement_points_left = 2;
    let players = [mover.clone()];

    let mut nav = NavigationEngine::new(&map, &players);
    let mut reachable = nav.reachable_tiles(&mover);
    reachable.sort_by_key(|p| (p.y, p.x));

    // Ground costs 1, water costs 2, the wall is unreachable.
    assert_eq!(
        reachable,
        vec![
            Position::new(1, 0),
            Position::new(2, 0),
            Position::new(0, 1),
        ]
    );
}

#[test]
fn test_reachable_tiles_excludes_own_tile() {
    let map = open_map(3);
    let mut mover = player_at(1, 1, 1);
    mover.attributes.movement_points_left = 5;
    let players = [mover.clone()];

    let mut nav = NavigationEngine::new(&map, &players);
    let reachable = nav.reachable_tiles(&mover);
    assert!(!reachable.contains(&mover.position));
    assert_eq!(reachable.len(), 8);
}

#[test]
fn test_kunee_opens_walls_at_ground_cost() {
    let map = map_3x3();
    let mut mover = player_at(1, 0, 0);
    mover.attributes.movement_points_left = 2;
    mover.inventory.push(Item::Kunee);
    let players = [mover.clone()];

    let mut nav = NavigationEngine::new(&map, &players);
    let reachable = nav.reachable_tiles(&mover);
    // (1,0) -> wall at (1,1) now costs 1 + 1.
    assert!(reachable.contains(&Position::new(1, 1)));
}

#[test]
fn test_occupied_tiles_skipped_for_humans_not_bots() {
    let map = open_map(3);
    let mut mover = player_at(1, 0, 0);
    mover.attributes.movement_points_left = 1;
    let blocker = player_at(2, 1, 0);
    let players = [mover.clone(), blocker];

    let mut nav = NavigationEngine::new(&map, &players);
    assert!(!nav.reachable_tiles(&mover).contains(&Position::new(1, 0)));

    let mut bot = bot_at(3, 0, 0);
    bot.attributes.movement_points_left = 1;
    let players = [bot.clone(), player_at(2, 1, 0)];
    let mut nav = NavigationEngine::new(&map, &players);
    assert!(nav.reachable_tiles(&bot).contains(&Position::new(1, 0)));
}

#[test]
fn test_closed_door_blocks_until_opened() {
    let map = GameMap::from_terrain(vec![
        vec![Ground, ClosedDoor, Ground],
        vec![Wall, Wall, Wall],
        vec![Wall, Wall, Wall],
    ])
    .unwrap();
    let mut mover = player_at(1, 0, 0);
    mover.attributes.movement_points_left = 4;
    let players = [mover.clone()];

    let mut nav = NavigationEngine::new(&map, &players);
    assert!(nav.reachable_tiles(&mover).is_empty());

    let mut open = map.clone();
    open.set_tile(Position::new(1, 0), OpenDoor);
    let mut nav = NavigationEngine::new(&open, &players);
    let reachable = nav.reachable_tiles(&mover);
    assert!(reachable.contains(&Position::new(1, 0)));
    assert!(reachable.contains(&Position::new(2, 0)));
}

// =========================================================================
// Fastest path
// =========================================================================

#[test]
fn test_fastest_path_prefers_cheap_terrain() {
    // Two routes from (0,0) to (4,0): straight through three waters
    // (cost 7), or a ground detour along the second row (cost 6).
    let mut terrain = vec![vec![Ground; 5]; 5];
    terrain[0] = vec![Ground, Water, Water, Water, Ground];
    let map = GameMap::from_terrain(terrain).unwrap();
    let mover = player_at(1, 0, 0);
    let players = [mover.clone()];

    let mut nav = NavigationEngine::new(&map, &players);
    let path = nav.fastest_path(&mover, Position::new(4, 0));
    assert_eq!(
        path,
        vec![
            Position::new(0, 1),
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(3, 1),
            Position::new(4, 1),
            Position::new(4, 0),
        ]
    );
}

#[test]
fn test_fastest_path_drops_origin_and_handles_unreachable() {
    let map = map_3x3();
    let mover = player_at(1, 0, 0);
    let players = [mover.clone()];
    let mut nav = NavigationEngine::new(&map, &players);

    let path = nav.fastest_path(&mover, Position::new(1, 0));
    assert_eq!(path, vec![Position::new(1, 0)]);

    // The wall is unreachable without the Kunee.
    assert!(nav.fastest_path(&mover, Position::new(1, 1)).is_empty());
    // Out of bounds degrades to "not reachable".
    assert!(nav.fastest_path(&mover, Position::new(9, 9)).is_empty());
}

#[test]
fn test_fastest_path_routes_around_players_but_may_end_on_one() {
    let map = open_map(3);
    let mover = player_at(1, 0, 1);
    let blocker = player_at(2, 1, 1);
    let players = [mover.clone(), blocker.clone()];
    let mut nav = NavigationEngine::new(&map, &players);

    // Path to the far side detours around the blocker.
    let path = nav.fastest_path(&mover, Position::new(2, 1));
    assert!(!path.is_empty());
    assert!(!path[..path.len() - 1].contains(&blocker.position));

    // A path may terminate on an occupied tile.
    let path = nav.fastest_path(&mover, blocker.position);
    assert_eq!(path, vec![blocker.position]);
}

// =========================================================================
// Closest valid tile / closest player
// =========================================================================

#[test]
fn test_closest_valid_tile_prefers_immediate_neighbor() {
    let map = open_map(3);
    let players = [player_at(1, 1, 1)];
    let nav = NavigationEngine::new(&map, &players);
    let found = nav.closest_valid_tile(Position::new(1, 1)).unwrap();
    assert!(Position::new(1, 1).is_adjacent_to(found));
}

#[test]
fn test_closest_valid_tile_widens_past_occupied_ring() {
    // Seed and all four neighbors occupied: the search must widen.
    let map = open_map(5);
    let players = [
        player_at(1, 2, 2),
        player_at(2, 1, 2),
        player_at(3, 3, 2),
        player_at(4, 2, 1),
        player_at(5, 2, 3),
    ];
    let nav = NavigationEngine::new(&map, &players);
    let found = nav.closest_valid_tile(Position::new(2, 2)).unwrap();
    assert!(players.iter().all(|p| p.position != found));
    // Two steps out from the seed.
    let d = found.x.abs_diff(2) + found.y.abs_diff(2);
    assert_eq!(d, 2);
}

#[test]
fn test_closest_valid_tile_skips_items_and_doors() {
    let mut map = GameMap::from_terrain(vec![
        vec![Ground, OpenDoor],
        vec![Ground, Ground],
    ])
    .unwrap();
    map.set_item(Position::new(0, 1), Some(Item::Xiphos));
    let players: [Player; 0] = [];
    let nav = NavigationEngine::new(&map, &players);
    // (1,0) is a door, (0,1) carries an item, so (1,1) is next by ring.
    assert_eq!(
        nav.closest_valid_tile(Position::new(0, 0)),
        Some(Position::new(1, 1))
    );
}

#[test]
fn test_closest_player_first_match_by_tile_order() {
    let map = open_map(4);
    let mut seeker = bot_at(1, 0, 0);
    seeker.attributes.movement_points_left = 6;
    let near = player_at(2, 2, 0);
    let far = player_at(3, 0, 3);
    let players = [seeker.clone(), near.clone(), far];

    let mut nav = NavigationEngine::new(&map, &players);
    let found = nav.closest_player(&seeker).unwrap();
    assert_eq!(found.id, near.id);
}

#[test]
fn test_closest_player_none_when_out_of_range() {
    let map = open_map(5);
    let mut seeker = player_at(1, 0, 0);
    seeker.attributes.movement_points_left = 2;
    let players = [seeker.clone(), player_at(2, 4, 4)];
    let mut nav = NavigationEngine::new(&map, &players);
    assert!(nav.closest_player(&seeker).is_none());
}

// =========================================================================
// Adjacency predicates
// =========================================================================

#[test]
fn test_combat_opponent_requires_adjacency() {
    let map = open_map(3);
    let actor = player_at(1, 0, 0);
    let near = player_at(2, 1, 0);
    let far = player_at(3, 2, 2);
    let players = [actor.clone(), near.clone(), far.clone()];
    let nav = NavigationEngine::new(&map, &players);

    let found = nav.combat_opponent(&ActionData {
        clicked_position: near.position,
        player_id: actor.id,
    });
    assert_eq!(found.map(|p| p.id), Some(near.id));

    // A click on a distant player resolves to nothing.
    assert!(nav
        .combat_opponent(&ActionData {
            clicked_position: far.position,
            player_id: actor.id,
        })
        .is_none());

    // Unknown actor: no-op.
    assert!(nav
        .combat_opponent(&ActionData {
            clicked_position: near.position,
            player_id: PlayerId(99),
        })
        .is_none());
}

#[test]
fn test_have_actions_requires_action_points() {
    let mut map = open_map(3);
    map.set_tile(Position::new(1, 0), ClosedDoor);
    let mut actor = player_at(1, 0, 0);
    let other = player_at(2, 0, 1);
    let players = [actor.clone(), other];
    let nav = NavigationEngine::new(&map, &players);

    assert!(nav.check_attack(&actor));
    assert!(nav.check_door(&actor));
    assert!(nav.have_actions(&actor));

    actor.attributes.action_points = 0;
    assert!(!nav.check_attack(&actor));
    assert!(!nav.check_door(&actor));
    assert!(!nav.have_actions(&actor));
}

#[test]
fn test_teleport_validation() {
    let mut map = open_map(3);
    map.set_tile(Position::new(1, 0), Wall);
    map.set_item(Position::new(2, 0), Some(Item::Spawn));
    map.set_item(Position::new(0, 1), Some(Item::Xiphos));
    let players = [player_at(1, 1, 1)];
    let nav = NavigationEngine::new(&map, &players);

    assert!(nav.is_valid_teleport(Position::new(0, 0)));
    // Spawn markers are allowed.
    assert!(nav.is_valid_teleport(Position::new(2, 0)));
    // Walls, items, occupied tiles, and out-of-bounds are not.
    assert!(!nav.is_valid_teleport(Position::new(1, 0)));
    assert!(!nav.is_valid_teleport(Position::new(0, 1)));
    assert!(!nav.is_valid_teleport(Position::new(1, 1)));
    assert!(!nav.is_valid_teleport(Position::new(5, 5)));
}

// =========================================================================
// Door toggling
// =========================================================================

#[test]
fn test_toggle_door_flips_adjacent_unoccupied_doors() {
    let mut map = open_map(3);
    map.set_tile(Position::new(1, 0), ClosedDoor);
    let actor = player_at(1, 0, 0);
    let players = [actor.clone()];

    assert!(toggle_door(&mut map, &players, Position::new(1, 0), &actor));
    assert_eq!(map.tile(Position::new(1, 0)), Some(OpenDoor));
    assert!(toggle_door(&mut map, &players, Position::new(1, 0), &actor));
    assert_eq!(map.tile(Position::new(1, 0)), Some(ClosedDoor));
}

#[test]
fn test_toggle_door_rejects_invalid_targets() {
    let mut map = open_map(3);
    map.set_tile(Position::new(2, 0), ClosedDoor);
    map.set_tile(Position::new(1, 1), OpenDoor);
    let actor = player_at(1, 0, 0);
    let squatter = player_at(2, 1, 1);
    let players = [actor.clone(), squatter];

    // Not adjacent.
    assert!(!toggle_door(&mut map, &players, Position::new(2, 0), &actor));
    // Not a door.
    assert!(!toggle_door(&mut map, &players, Position::new(1, 0), &actor));
    // Occupied (and also not adjacent to the actor).
    assert!(!toggle_door(&mut map, &players, Position::new(1, 1), &actor));
    assert_eq!(map.tile(Position::new(2, 0)), Some(ClosedDoor));
}
